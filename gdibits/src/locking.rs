use crate::bitmap_data::BitmapData;
use crate::error::{Error, InvalidEnumArgument};
use crate::interface::{ImageLockMode, Interface, Rect};
use crate::pinning::PinningMarshaller;
use crate::pixel_format::PixelFormat;

/// `Locker` makes the native lock-bits calls of an [`Interface`] with the
/// record pinned for exactly the duration of each call.
///
/// This is the only place in the crate that calls into the interface, and so
/// the only place that hands out a record's raw address. Every call acquires
/// a [`PinningMarshaller`] for the record and releases it before returning,
/// whether the native call succeeded or not.
pub struct Locker<I: Interface> {
    raw: I,
}

impl<I: Interface> Locker<I> {
    pub fn new(interface: I) -> Self {
        Self { raw: interface }
    }

    /// Consumes the locker and returns the interface it was wrapping.
    pub fn into_inner(self) -> I {
        self.raw
    }

    pub fn interface(&self) -> &I {
        &self.raw
    }

    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.raw
    }

    /// Locks `rect` (or the whole bitmap) and describes the locked pixels in
    /// `data`.
    ///
    /// When `mode` includes [`ImageLockMode::USER_INPUT_BUFFER`] the caller
    /// must already have set `data`'s `stride` and `scan0` to a buffer that
    /// stays alive until the matching [`unlock_bits`](Self::unlock_bits).
    /// Otherwise `scan0` points into memory owned by the native side, valid
    /// only until the matching unlock.
    pub fn lock_bits(
        &mut self,
        rect: Option<&Rect>,
        mode: ImageLockMode,
        format: PixelFormat,
        data: &mut BitmapData,
    ) -> Result<(), Error<I>> {
        log::debug!("lock_bits {:?} {:?} as {}", rect, mode, format);
        let pin = PinningMarshaller::acquire(Some(data));
        let r = unsafe { self.raw.lock_bits(rect, mode, format, pin.as_ptr()) };
        pin.release();
        if r.is_err() {
            log::warn!("native lock_bits failed for {:?} {:?} as {}", rect, mode, format);
        }
        Error::interface_result(r)
    }

    /// Like [`lock_bits`](Self::lock_bits), but takes the format as a raw
    /// native tag and the mode as raw flags, rejecting values outside their
    /// sets before anything is passed to the native side.
    pub fn lock_bits_raw(
        &mut self,
        rect: Option<&Rect>,
        mode: u32,
        format: i32,
        data: &mut BitmapData,
    ) -> Result<(), Error<I>> {
        use core::convert::TryFrom;
        let mode = ImageLockMode::try_from(mode)?;
        let format = PixelFormat::try_from(format)
            .map_err(|_| InvalidEnumArgument::new::<PixelFormat>("format", format.into()))?;
        self.lock_bits(rect, mode, format, data)
    }

    /// Ends the lock described by `data`.
    pub fn unlock_bits(&mut self, data: &mut BitmapData) -> Result<(), Error<I>> {
        log::debug!("unlock_bits");
        let pin = PinningMarshaller::acquire(Some(data));
        let r = unsafe { self.raw.unlock_bits(pin.as_ptr()) };
        pin.release();
        if r.is_err() {
            log::warn!("native unlock_bits failed");
        }
        Error::interface_result(r)
    }

    /// Locks, runs `f` with the populated record, and then unlocks.
    ///
    /// The unlock happens whatever `f` returns, so an `f` returning its own
    /// `Result` gets its error back from the `Ok` of this method. If the
    /// unlock itself fails then its error is returned instead of `f`'s
    /// result. A panic in `f` skips the unlock.
    pub fn with_locked_bits<F, R>(
        &mut self,
        rect: Option<&Rect>,
        mode: ImageLockMode,
        format: PixelFormat,
        data: &mut BitmapData,
        f: F,
    ) -> Result<R, Error<I>>
    where
        F: FnOnce(&mut BitmapData) -> R,
    {
        self.lock_bits(rect, mode, format, data)?;
        let result = f(data);
        self.unlock_bits(data)?;
        Ok(result)
    }
}
