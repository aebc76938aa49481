use crate::error::InvalidEnumArgument;
use crate::pixel_format::{self, PixelFormat};
use core::convert::TryFrom;
use core::ffi::c_void;
#[cfg(feature = "pinning")]
use core::ptr::NonNull;
use static_assertions::{assert_not_impl_any, const_assert_eq};

/// Describes a block of pixel data: its dimensions, row stride, pixel
/// encoding, and the address of the first pixel.
///
/// This is the record the native imaging subsystem's "lock bits" routines
/// read and write. Its layout is fixed: the fields are in declaration order
/// with natural alignment and nothing else, as checked at compile time by
/// the `*_OFFSET` constants below. The native side computes the position of
/// every field from the address of `width`.
///
/// A `BitmapData` doesn't own the buffer at `scan0`. Whatever allocated that
/// buffer must keep it alive for as long as the native side might use it.
///
/// Only the pixel format is validated, and only on the way in: the native
/// side may store a tag this crate doesn't list, so the field holds the raw
/// tag and [`pixel_format`](Self::pixel_format) reports such tags as errors.
/// Width, height, stride and the reserved slot accept any value; the native
/// call is the authority on which geometry it can work with.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct BitmapData {
    width: i32,
    height: i32,
    stride: i32,
    pixel_format: i32,
    scan0: *mut c_void,
    reserved: i32,
}

impl BitmapData {
    pub const WIDTH_OFFSET: usize = core::mem::offset_of!(BitmapData, width);
    pub const HEIGHT_OFFSET: usize = core::mem::offset_of!(BitmapData, height);
    pub const STRIDE_OFFSET: usize = core::mem::offset_of!(BitmapData, stride);
    pub const PIXEL_FORMAT_OFFSET: usize = core::mem::offset_of!(BitmapData, pixel_format);
    pub const SCAN0_OFFSET: usize = core::mem::offset_of!(BitmapData, scan0);
    pub const RESERVED_OFFSET: usize = core::mem::offset_of!(BitmapData, reserved);

    /// Returns a record with every field zeroed, a null `scan0`, and a pixel
    /// format of `DontCare`.
    pub const fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            stride: 0,
            pixel_format: PixelFormat::DontCare.to_raw(),
            scan0: core::ptr::null_mut(),
            reserved: 0,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn set_width(&mut self, v: i32) {
        self.width = v;
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn set_height(&mut self, v: i32) {
        self.height = v;
    }

    /// The number of bytes between the start of one row and the start of
    /// the next. Negative for bottom-up layouts.
    pub fn stride(&self) -> i32 {
        self.stride
    }

    pub fn set_stride(&mut self, v: i32) {
        self.stride = v;
    }

    /// Returns the stored pixel format.
    ///
    /// Every format set through this type is a member of [`PixelFormat`],
    /// but a native call may have written some other tag. That case is
    /// reported as an error carrying the raw tag, which is also available
    /// from [`pixel_format_raw`](Self::pixel_format_raw).
    pub fn pixel_format(&self) -> Result<PixelFormat, InvalidEnumArgument> {
        PixelFormat::try_from(self.pixel_format).map_err(|_| {
            InvalidEnumArgument::new::<PixelFormat>("pixel_format", self.pixel_format.into())
        })
    }

    /// Returns the stored pixel format tag exactly as the native side sees
    /// it.
    pub fn pixel_format_raw(&self) -> i32 {
        self.pixel_format
    }

    /// Stores a new pixel format given as the native subsystem's raw tag
    /// value.
    ///
    /// Returns an error, leaving the current format unchanged, if `value`
    /// isn't a member of the [`PixelFormat`] set. Code that already has a
    /// `PixelFormat` can pass `format.into()`, or use
    /// [`with_pixel_format`](Self::with_pixel_format).
    pub fn set_pixel_format(&mut self, value: i32) -> Result<(), InvalidEnumArgument> {
        if !PixelFormat::is_valid(value) {
            return Err(InvalidEnumArgument::new::<PixelFormat>("value", value.into()));
        }
        self.pixel_format = value;
        Ok(())
    }

    /// The address of the first byte of pixel data.
    pub fn scan0(&self) -> *mut c_void {
        self.scan0
    }

    pub fn set_scan0(&mut self, v: *mut c_void) {
        self.scan0 = v;
    }

    /// Reserved for the native subsystem. Passed through unchanged.
    pub fn reserved(&self) -> i32 {
        self.reserved
    }

    pub fn set_reserved(&mut self, v: i32) {
        self.reserved = v;
    }

    pub fn with_size(self, width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..self
        }
    }

    pub fn with_stride(self, stride: i32) -> Self {
        Self { stride, ..self }
    }

    pub fn with_pixel_format(self, pixel_format: PixelFormat) -> Self {
        Self {
            pixel_format: pixel_format.to_raw(),
            ..self
        }
    }

    pub fn with_scan0(self, scan0: *mut c_void) -> Self {
        Self { scan0, ..self }
    }

    /// Returns the number of bytes spanned by all of the rows, or zero if
    /// the height is not positive. Saturates at `usize::MAX`.
    pub fn buffer_len(&self) -> usize {
        if self.height <= 0 {
            return 0;
        }
        (self.stride.unsigned_abs() as usize).saturating_mul(self.height as usize)
    }

    /// The number of bytes of pixel data in each row, which may be less than
    /// the stride. Saturates at `usize::MAX`.
    ///
    /// The bits per pixel come from the raw tag, so this also works for tags
    /// written by the native side that aren't members of [`PixelFormat`].
    pub fn row_len(&self) -> usize {
        if self.width <= 0 {
            return 0;
        }
        let bpp = PixelFormat::raw_bits_per_pixel(self.pixel_format);
        let len = pixel_format::row_bytes(self.width as u32, bpp);
        usize::try_from(len).unwrap_or(usize::MAX)
    }

    /// Returns the pixel bytes of row `y` of the described buffer.
    ///
    /// # Safety
    ///
    /// `scan0` and `stride` must describe a live buffer of at least `height`
    /// rows of at least [`row_len`](Self::row_len) bytes each, `y` must be
    /// less than `height`, and the row must not be written through any
    /// other path for the lifetime `'b`.
    pub unsafe fn row<'b>(&self, y: usize) -> &'b [u8] {
        debug_assert!((y as i64) < self.height as i64);
        core::slice::from_raw_parts(self.row_ptr(y), self.row_len())
    }

    /// Mutable version of [`row`](Self::row).
    ///
    /// # Safety
    ///
    /// As for `row`, and the row must not be accessed through any other
    /// path for the lifetime `'b`.
    pub unsafe fn row_mut<'b>(&mut self, y: usize) -> &'b mut [u8] {
        debug_assert!((y as i64) < self.height as i64);
        core::slice::from_raw_parts_mut(self.row_ptr(y), self.row_len())
    }

    fn row_ptr(&self, y: usize) -> *mut u8 {
        self.scan0
            .cast::<u8>()
            .wrapping_offset(y as isize * self.stride as isize)
    }

    /// Returns the address of `width`, which is the address the native
    /// subsystem expects for the whole record.
    ///
    /// The pointer is derived from the whole record rather than from the
    /// `width` field alone, so writes through it may reach every field.
    #[cfg(feature = "pinning")]
    pub(crate) fn pinnable_reference(&mut self) -> NonNull<i32> {
        NonNull::from(self).cast::<i32>()
    }
}

impl Default for BitmapData {
    fn default() -> Self {
        Self::new()
    }
}

const_assert_eq!(BitmapData::WIDTH_OFFSET, 0);
const_assert_eq!(BitmapData::HEIGHT_OFFSET, 4);
const_assert_eq!(BitmapData::STRIDE_OFFSET, 8);
const_assert_eq!(BitmapData::PIXEL_FORMAT_OFFSET, 12);
const_assert_eq!(BitmapData::SCAN0_OFFSET, 16);
const_assert_eq!(
    BitmapData::RESERVED_OFFSET,
    16 + core::mem::size_of::<*mut c_void>()
);
const_assert_eq!(core::mem::size_of::<PixelFormat>(), 4);

#[cfg(target_pointer_width = "64")]
const_assert_eq!(core::mem::size_of::<BitmapData>(), 32);
#[cfg(target_pointer_width = "32")]
const_assert_eq!(core::mem::size_of::<BitmapData>(), 24);

// The record is a borrowed view of someone else's buffer.
assert_not_impl_any!(BitmapData: Send, Sync);
