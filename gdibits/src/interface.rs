//! The seam between this crate and the native imaging subsystem.

use crate::error::InvalidEnumArgument;
use crate::pixel_format::PixelFormat;
use core::convert::TryFrom;

pub mod fake;

/// Implementations of `Interface` serve as adapters between the lock-bits
/// calls this library makes and a specific native imaging subsystem, such as
/// GDI+.
///
/// The main library contains no binding to a real native library, in order
/// to keep the library portable. The [`fake`] module has an in-memory
/// implementation for tests and examples.
///
/// Both methods receive the record as the raw address of its first field,
/// as produced by [`PinningMarshaller`](crate::pinning::PinningMarshaller).
/// The address may be null when a caller has no record to pass, and
/// implementations must then fail rather than dereference it.
///
/// # Safety
///
/// Implementations may write any value into any field of the record, at the
/// field offsets given by [`BitmapData`](crate::BitmapData), including pixel
/// format tags that aren't members of [`PixelFormat`]. They must not write
/// outside the record, and must not access it through the given address
/// after returning.
pub unsafe trait Interface {
    type Error;

    /// Locks a rectangle of a bitmap into memory, describing the locked
    /// pixels in the record at `data`.
    ///
    /// With no `rect` the whole bitmap is locked. If `mode` includes
    /// [`ImageLockMode::USER_INPUT_BUFFER`] then the caller has already
    /// populated the record's `stride` and `scan0` with a buffer of its own,
    /// which the native side fills instead of exposing its own memory.
    ///
    /// # Safety
    ///
    /// `data` must be null or point to a [`BitmapData`](crate::BitmapData)
    /// that is valid for reads and writes for the duration of the call. A
    /// user-supplied buffer must be large enough for the locked rectangle
    /// at the given stride.
    unsafe fn lock_bits(
        &mut self,
        rect: Option<&Rect>,
        mode: ImageLockMode,
        format: PixelFormat,
        data: *mut i32,
    ) -> Result<(), Self::Error>;

    /// Ends a lock previously started with `lock_bits`, writing back any
    /// changes made through a user-supplied buffer.
    ///
    /// # Safety
    ///
    /// Same as for `lock_bits`, and `data` must describe the same lock.
    unsafe fn unlock_bits(&mut self, data: *mut i32) -> Result<(), Self::Error>;
}

/// A rectangle of a bitmap, in pixels, laid out as the native subsystem
/// expects.
#[repr(C)]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` if the rectangle has positive size and lies entirely
    /// within a bitmap of the given dimensions.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let right = self.x as i64 + self.width as i64;
        let bottom = self.y as i64 + self.height as i64;
        self.x >= 0
            && self.y >= 0
            && self.width > 0
            && self.height > 0
            && right <= width as i64
            && bottom <= height as i64
    }
}

/// Access flags for a lock-bits call.
///
/// These combine with `|`. A valid mode includes at least one of
/// [`READ_ONLY`](Self::READ_ONLY) and [`WRITE_ONLY`](Self::WRITE_ONLY).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct ImageLockMode(u32);

impl ImageLockMode {
    pub const READ_ONLY: Self = Self(0x0001);
    pub const WRITE_ONLY: Self = Self(0x0002);
    pub const READ_WRITE: Self = Self(0x0003);
    pub const USER_INPUT_BUFFER: Self = Self(0x0004);

    /// Mask representing the bits of a u32 that may be set.
    pub const MASK: u32 = 0x0007;

    /// Test whether the given raw value is a valid combination of flags,
    /// returning `true` only if so.
    pub const fn is_valid(raw: u32) -> bool {
        (raw & !Self::MASK) == 0 && (raw & Self::READ_WRITE.0) != 0
    }

    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub const fn can_read(self) -> bool {
        self.contains(Self::READ_ONLY)
    }

    pub const fn can_write(self) -> bool {
        self.contains(Self::WRITE_ONLY)
    }

    pub const fn uses_user_buffer(self) -> bool {
        self.contains(Self::USER_INPUT_BUFFER)
    }
}

impl core::ops::BitOr for ImageLockMode {
    type Output = Self;

    fn bitor(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl TryFrom<u32> for ImageLockMode {
    type Error = InvalidEnumArgument;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        if Self::is_valid(raw) {
            Ok(Self(raw))
        } else {
            Err(InvalidEnumArgument::new::<Self>("flags", raw.into()))
        }
    }
}

impl From<ImageLockMode> for u32 {
    fn from(mode: ImageLockMode) -> u32 {
        mode.0
    }
}
