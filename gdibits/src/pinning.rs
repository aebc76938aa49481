//! Pinning a [`BitmapData`] at a stable address for the duration of one
//! native call.
//!
//! While a [`PinningMarshaller`] exists it holds the exclusive borrow of its
//! record, so safe code can neither move the record nor touch its fields, and
//! the address returned by [`as_ptr`](PinningMarshaller::as_ptr) stays valid.
//! The pin ends when the marshaller is released or dropped, whichever comes
//! first, and after that the address must not be used.

use crate::bitmap_data::BitmapData;
use core::marker::PhantomData;
use core::ptr::NonNull;

/// Whether a [`PinningMarshaller`] currently holds a record in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    Unpinned,
    Pinned,
}

/// Holds a [`BitmapData`] in place and exposes the address the native
/// subsystem expects for it.
///
/// Marshalling an absent record is allowed, because some native calls take
/// an optional record. In that case the address is null and the marshaller
/// never becomes pinned.
pub struct PinningMarshaller<'a> {
    pinned: Option<NonNull<i32>>,
    _record: PhantomData<&'a mut BitmapData>,
}

impl<'a> PinningMarshaller<'a> {
    /// Pins the given record, if any, until the returned marshaller is
    /// released or dropped.
    pub fn acquire(record: Option<&'a mut BitmapData>) -> Self {
        let pinned = record.map(|r| r.pinnable_reference());
        if let Some(ptr) = pinned {
            log::trace!("pinned bitmap data at {:p}", ptr);
        }
        Self {
            pinned,
            _record: PhantomData,
        }
    }

    /// Returns the address of the pinned record's `width` field, or null if
    /// there is no record.
    ///
    /// The result is only valid to dereference while `self` is alive.
    #[inline]
    pub fn as_ptr(&self) -> *mut i32 {
        match self.pinned {
            Some(ptr) => ptr.as_ptr(),
            None => core::ptr::null_mut(),
        }
    }

    pub fn state(&self) -> PinState {
        match self.pinned {
            Some(_) => PinState::Pinned,
            None => PinState::Unpinned,
        }
    }

    /// Ends the pin, returning the borrow of the record to the caller.
    ///
    /// Dropping the marshaller has the same effect; this method exists so
    /// that the end of the pin can be written out explicitly.
    pub fn release(mut self) {
        self.unpin();
    }

    fn unpin(&mut self) {
        if let Some(ptr) = self.pinned.take() {
            log::trace!("released bitmap data at {:p}", ptr);
        }
    }
}

impl<'a> Drop for PinningMarshaller<'a> {
    fn drop(&mut self) {
        self.unpin();
    }
}

impl<'a> core::fmt::Debug for PinningMarshaller<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PinningMarshaller {{ {:?} at {:p} }}", self.state(), self.as_ptr())
    }
}

/// Runs `f` with the native address of `record`, pinning the record for
/// exactly the duration of the call.
///
/// The pin is released when `f` returns, and also if `f` unwinds.
pub fn with_pinned<R, F>(record: Option<&mut BitmapData>, f: F) -> R
where
    F: FnOnce(*mut i32) -> R,
{
    let pin = PinningMarshaller::acquire(record);
    let result = f(pin.as_ptr());
    pin.release();
    result
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::PixelFormat;
    use core::ffi::c_void;

    fn sample() -> BitmapData {
        BitmapData::new()
            .with_size(4, 2)
            .with_stride(16)
            .with_pixel_format(PixelFormat::Format32bppArgb)
            .with_scan0(0x1000 as *mut c_void)
    }

    #[test]
    fn test_acquire_none() {
        let pin = PinningMarshaller::acquire(None);
        assert!(pin.as_ptr().is_null());
        assert_eq!(pin.state(), PinState::Unpinned);
        pin.release();
    }

    #[test]
    fn test_acquire_reads_fields() {
        let mut bd = sample();
        let expected = bd;
        let record_addr = &bd as *const BitmapData as usize;
        let pin = PinningMarshaller::acquire(Some(&mut bd));
        assert_eq!(pin.state(), PinState::Pinned);

        let ptr = pin.as_ptr();
        assert_eq!(ptr as usize, record_addr);
        unsafe {
            assert_eq!(*ptr, expected.width());
            assert_eq!(*ptr.add(1), expected.height());
            assert_eq!(*ptr.add(2), expected.stride());
            assert_eq!(*ptr.add(3), expected.pixel_format_raw());
            let bytes = ptr.cast::<u8>();
            assert_eq!(
                bytes
                    .add(BitmapData::SCAN0_OFFSET)
                    .cast::<*mut c_void>()
                    .read(),
                expected.scan0()
            );
            assert_eq!(
                bytes.add(BitmapData::RESERVED_OFFSET).cast::<i32>().read(),
                expected.reserved()
            );
        }
        pin.release();
        assert_eq!(bd, expected);
    }

    #[test]
    fn test_native_writes_visible_after_release() {
        let mut bd = sample();
        with_pinned(Some(&mut bd), |ptr| unsafe {
            ptr.add(1).write(7);
            ptr.cast::<u8>()
                .add(BitmapData::RESERVED_OFFSET)
                .cast::<i32>()
                .write(-1);
        });
        assert_eq!(bd.height(), 7);
        assert_eq!(bd.reserved(), -1);
        assert_eq!(bd.width(), 4);
    }

    #[test]
    fn test_native_writes_unlisted_format() {
        let mut bd = sample();
        with_pinned(Some(&mut bd), |ptr| unsafe { ptr.add(3).write(0x200F) });
        assert_eq!(bd.pixel_format_raw(), 0x200F);
        assert!(!PixelFormat::is_valid(bd.pixel_format_raw()));
        assert_eq!(bd.pixel_format().map_err(|e| e.value), Err(0x200F));
        // The rest of the record reads as before.
        assert_eq!(bd.width(), 4);
        assert_eq!(bd.row_len(), 16);
    }

    #[test]
    fn test_with_pinned_none() {
        let was_null = with_pinned(None, |ptr| ptr.is_null());
        assert!(was_null);
    }

    #[test]
    fn test_reacquire() {
        let mut bd = sample();
        let first = PinningMarshaller::acquire(Some(&mut bd));
        let first_addr = first.as_ptr() as usize;
        drop(first);

        // The record hasn't moved, so it happens to come back at the same
        // address, but nothing relies on that.
        let second = PinningMarshaller::acquire(Some(&mut bd));
        assert_eq!(second.state(), PinState::Pinned);
        assert_eq!(second.as_ptr() as usize, first_addr);
        second.release();

        let mut moved = std::boxed::Box::new(bd);
        let third = PinningMarshaller::acquire(Some(&mut *moved));
        assert_eq!(unsafe { *third.as_ptr() }, 4);
    }

    #[test]
    fn test_released_on_unwind() {
        let mut bd = sample();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            with_pinned(Some(&mut bd), |ptr| {
                unsafe { ptr.write(99) };
                panic!("native call failed");
            })
        }));
        assert!(result.is_err());
        // The borrow is back with us, and the write before the failure stuck.
        bd.set_width(bd.width() + 1);
        assert_eq!(bd.width(), 100);
    }

    #[test]
    fn test_debug() {
        let pin = PinningMarshaller::acquire(None);
        let s = std::format!("{:?}", pin);
        assert!(s.starts_with("PinningMarshaller { Unpinned at 0x"));
    }
}
