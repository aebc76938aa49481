//! Fake `Interface` implementation for testing and examples.

use super::{ImageLockMode, Rect};
use crate::bitmap_data::BitmapData;
use crate::pixel_format::PixelFormat;
use core::ffi::c_void;

/// An implementation of [`Interface`](super::Interface) which locks a bitmap
/// held in a buffer in local RAM.
///
/// It behaves like the native lock-bits routines as far as the record is
/// concerned: it reads and writes the record's fields through the raw
/// address it's given, at the fixed offsets, and either exposes its own
/// buffer through `scan0` or copies into and out of a caller's buffer when
/// asked for [`ImageLockMode::USER_INPUT_BUFFER`]. It doesn't convert between
/// pixel formats.
///
/// Rows in the buffer are padded to a multiple of four bytes.
pub struct Interface<'a> {
    pixels: &'a mut [u8],
    width: u32,
    height: u32,
    stride: u32,
    format: PixelFormat,

    lock: Option<ActiveLock>,
}

#[derive(Debug, Clone, Copy)]
struct ActiveLock {
    mode: ImageLockMode,
    rows: usize,
    row_len: usize,
    first: usize,
    user_buffer: Option<(*mut u8, i32)>,
}

impl<'a> Interface<'a> {
    /// Wraps the given buffer as a bitmap of the given size and format.
    ///
    /// The buffer must be at least [`required_len`](Self::required_len)
    /// bytes. The format must describe a concrete encoding, so the flag-only
    /// members and `DontCare` are rejected. The dimensions and the resulting
    /// stride must fit the record's `i32` fields.
    pub fn new(
        pixels: &'a mut [u8],
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, Error> {
        if format.bits_per_pixel() == 0 {
            return Err(Error::UnsupportedFormat(format));
        }
        let stride = Self::stride_for(format, width);
        if width > i32::MAX as u32 || height > i32::MAX as u32 || stride > i32::MAX as u64 {
            return Err(Error::TooLarge { width, height });
        }
        let needed = Self::required_len(format, width, height);
        if (pixels.len() as u64) < needed {
            return Err(Error::BufferTooSmall {
                size: pixels.len(),
                needed,
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
            stride: stride as u32,
            format,
            lock: None,
        })
    }

    /// The stride the fake uses for a bitmap of the given format and width.
    pub const fn stride_for(format: PixelFormat, width: u32) -> u64 {
        (format.minimum_stride(width) + 3) & !3
    }

    /// The number of bytes needed to back a bitmap of the given format and
    /// size, saturating at `u64::MAX`.
    pub const fn required_len(format: PixelFormat, width: u32, height: u32) -> u64 {
        Self::stride_for(format, width).saturating_mul(height as u64)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels[..]
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels[..]
    }

    fn resolve_format(&self, requested: PixelFormat) -> Result<PixelFormat, Error> {
        if requested == PixelFormat::DontCare || requested == self.format {
            Ok(self.format)
        } else {
            Err(Error::FormatMismatch {
                bitmap: self.format,
                requested,
            })
        }
    }

    fn resolve_rect(&self, rect: Option<&Rect>) -> Result<Rect, Error> {
        let rect = match rect {
            Some(r) => *r,
            None => Rect::new(0, 0, self.width as i32, self.height as i32),
        };
        if !rect.fits_within(self.width, self.height) {
            return Err(Error::OutOfBounds(rect));
        }
        let bpp = self.format.bits_per_pixel() as usize;
        if (rect.x as usize * bpp) % 8 != 0 {
            return Err(Error::UnalignedRect(rect));
        }
        Ok(rect)
    }

    fn byte_offset(&self, x: i32, y: i32) -> usize {
        let bpp = self.format.bits_per_pixel() as usize;
        y as usize * self.stride as usize + (x as usize * bpp) / 8
    }
}

unsafe fn read_field<T: Copy>(base: *mut u8, offset: usize) -> T {
    base.add(offset).cast::<T>().read()
}

unsafe fn write_field<T>(base: *mut u8, offset: usize, v: T) {
    base.add(offset).cast::<T>().write(v)
}

unsafe impl<'a> super::Interface for Interface<'a> {
    type Error = Error;

    unsafe fn lock_bits(
        &mut self,
        rect: Option<&Rect>,
        mode: ImageLockMode,
        format: PixelFormat,
        data: *mut i32,
    ) -> Result<(), Error> {
        if data.is_null() {
            return Err(Error::NullData);
        }
        if self.lock.is_some() {
            return Err(Error::AlreadyLocked);
        }
        if !ImageLockMode::is_valid(mode.into()) {
            return Err(Error::InvalidMode(mode));
        }
        let format = self.resolve_format(format)?;
        let rect = self.resolve_rect(rect)?;

        let base = data.cast::<u8>();
        let rows = rect.height as usize;
        let row_len = format.minimum_stride(rect.width as u32) as usize;
        let first = self.byte_offset(rect.x, rect.y);

        let user_buffer = if mode.uses_user_buffer() {
            let scan0 = read_field::<*mut c_void>(base, BitmapData::SCAN0_OFFSET).cast::<u8>();
            let stride = read_field::<i32>(base, BitmapData::STRIDE_OFFSET);
            if scan0.is_null() {
                return Err(Error::NullUserBuffer);
            }
            if (stride.unsigned_abs() as usize) < row_len {
                return Err(Error::StrideTooSmall {
                    stride,
                    needed: row_len,
                });
            }
            if mode.can_read() {
                for y in 0..rows {
                    let start = first + y * self.stride as usize;
                    let src = &self.pixels[start..start + row_len];
                    let dst = scan0.offset(y as isize * stride as isize);
                    core::ptr::copy_nonoverlapping(src.as_ptr(), dst, row_len);
                }
            }
            Some((scan0, stride))
        } else {
            let scan0 = self.pixels.as_mut_ptr().add(first);
            write_field(base, BitmapData::STRIDE_OFFSET, self.stride as i32);
            write_field(base, BitmapData::SCAN0_OFFSET, scan0.cast::<c_void>());
            None
        };

        write_field(base, BitmapData::WIDTH_OFFSET, rect.width);
        write_field(base, BitmapData::HEIGHT_OFFSET, rect.height);
        write_field(base, BitmapData::PIXEL_FORMAT_OFFSET, format.to_raw());

        self.lock = Some(ActiveLock {
            mode,
            rows,
            row_len,
            first,
            user_buffer,
        });
        Ok(())
    }

    unsafe fn unlock_bits(&mut self, data: *mut i32) -> Result<(), Error> {
        if data.is_null() {
            return Err(Error::NullData);
        }
        let lock = match self.lock.take() {
            Some(lock) => lock,
            None => return Err(Error::NotLocked),
        };
        if let (Some((scan0, stride)), true) = (lock.user_buffer, lock.mode.can_write()) {
            for y in 0..lock.rows {
                let start = lock.first + y * self.stride as usize;
                let dst = &mut self.pixels[start..start + lock.row_len];
                let src = scan0.offset(y as isize * stride as isize);
                core::ptr::copy_nonoverlapping(src, dst.as_mut_ptr(), lock.row_len);
            }
        }
        Ok(())
    }
}

/// Errors returned by the fake interface, standing in for the status codes a
/// real native subsystem would return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    NullData,
    AlreadyLocked,
    NotLocked,
    InvalidMode(ImageLockMode),
    UnsupportedFormat(PixelFormat),
    FormatMismatch {
        bitmap: PixelFormat,
        requested: PixelFormat,
    },
    OutOfBounds(Rect),
    UnalignedRect(Rect),
    BufferTooSmall {
        size: usize,
        needed: u64,
    },
    TooLarge {
        width: u32,
        height: u32,
    },
    NullUserBuffer,
    StrideTooSmall {
        stride: i32,
        needed: usize,
    },
}
