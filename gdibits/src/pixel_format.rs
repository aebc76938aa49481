//! The closed set of pixel encodings understood by the native imaging
//! subsystem.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// A pixel encoding tag, as accepted by the validated pixel format setter of
/// [`BitmapData`](crate::BitmapData).
///
/// The discriminants are the native subsystem's own integer values and must
/// not change. The lowest byte is an ordinal, the second byte is the number
/// of bits per pixel, and bits 16 through 21 are flags which also appear
/// on their own as the `Indexed` through `Canonical` members.
///
/// Conversion from a raw `i32` is fallible, via `TryFrom`. Use
/// [`PixelFormat::is_valid`] when only a yes/no answer is needed.
#[derive(TryFromPrimitive, IntoPrimitive, Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(i32)]
pub enum PixelFormat {
    DontCare = 0,
    Max = 15,
    Indexed = 0x0001_0000,
    Gdi = 0x0002_0000,
    Alpha = 0x0004_0000,
    PAlpha = 0x0008_0000,
    Extended = 0x0010_0000,
    Canonical = 0x0020_0000,
    Format1bppIndexed = 0x0003_0101,
    Format4bppIndexed = 0x0003_0402,
    Format8bppIndexed = 0x0003_0803,
    Format16bppGrayScale = 0x0010_1004,
    Format16bppRgb555 = 0x0002_1005,
    Format16bppRgb565 = 0x0002_1006,
    Format16bppArgb1555 = 0x0006_1007,
    Format24bppRgb = 0x0002_1808,
    Format32bppRgb = 0x0002_2009,
    Format32bppArgb = 0x0026_200A,
    Format32bppPArgb = 0x000E_200B,
    Format48bppRgb = 0x0010_300C,
    Format64bppArgb = 0x0034_400D,
    Format64bppPArgb = 0x001C_400E,
}

impl PixelFormat {
    /// `Undefined` shares its value with `DontCare`.
    pub const UNDEFINED: Self = Self::DontCare;

    /// Every member of the set, in ascending order of native value.
    pub const ALL: [Self; 22] = [
        Self::DontCare,
        Self::Max,
        Self::Indexed,
        Self::Gdi,
        Self::Format16bppRgb555,
        Self::Format16bppRgb565,
        Self::Format24bppRgb,
        Self::Format32bppRgb,
        Self::Format1bppIndexed,
        Self::Format4bppIndexed,
        Self::Format8bppIndexed,
        Self::Alpha,
        Self::Format16bppArgb1555,
        Self::PAlpha,
        Self::Format32bppPArgb,
        Self::Extended,
        Self::Format16bppGrayScale,
        Self::Format48bppRgb,
        Self::Format64bppPArgb,
        Self::Canonical,
        Self::Format32bppArgb,
        Self::Format64bppArgb,
    ];

    /// Returns `true` only if the given raw value is one of the members
    /// listed in [`ALL`](Self::ALL).
    pub fn is_valid(raw: i32) -> bool {
        Self::ALL.iter().any(|f| f.to_raw() == raw)
    }

    /// Returns the native integer value of the tag.
    #[inline]
    pub const fn to_raw(self) -> i32 {
        self as i32
    }

    /// The number of bits used to store one pixel, or zero for the tags that
    /// don't describe a concrete encoding, such as `DontCare` or the flag-only
    /// members.
    pub const fn bits_per_pixel(self) -> u32 {
        Self::raw_bits_per_pixel(self.to_raw())
    }

    /// Like [`bits_per_pixel`](Self::bits_per_pixel), but for a raw tag that
    /// need not be a member of the set. Native subsystems use the same bit
    /// layout for tags this crate doesn't list.
    pub const fn raw_bits_per_pixel(raw: i32) -> u32 {
        ((raw >> 8) & 0xff) as u32
    }

    /// The minimum number of bytes needed to hold one row of `width` pixels
    /// in this format, ignoring any alignment the native side might add.
    ///
    /// Computed in 64 bits, so this is exact for every `u32` width.
    pub const fn minimum_stride(self, width: u32) -> u64 {
        row_bytes(width, self.bits_per_pixel())
    }

    pub const fn is_indexed(self) -> bool {
        self.has_flag(Self::Indexed)
    }

    pub const fn is_gdi(self) -> bool {
        self.has_flag(Self::Gdi)
    }

    pub const fn has_alpha(self) -> bool {
        self.has_flag(Self::Alpha)
    }

    /// Alpha has already been multiplied into the colour channels.
    pub const fn is_premultiplied(self) -> bool {
        self.has_flag(Self::PAlpha)
    }

    /// Uses more than eight bits per channel.
    pub const fn is_extended(self) -> bool {
        self.has_flag(Self::Extended)
    }

    pub const fn is_canonical(self) -> bool {
        self.has_flag(Self::Canonical)
    }

    const fn has_flag(self, flag: Self) -> bool {
        (self.to_raw() & flag.to_raw()) != 0
    }
}

pub(crate) const fn row_bytes(width: u32, bits_per_pixel: u32) -> u64 {
    (width as u64 * bits_per_pixel as u64 + 7) / 8
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self::DontCare
    }
}

impl core::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?} ({:#010x})", self, self.to_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::TryFrom;

    #[test]
    fn test_all_members_valid() {
        for f in PixelFormat::ALL.iter() {
            assert!(PixelFormat::is_valid(f.to_raw()), "{} should be valid", f);
            assert_eq!(PixelFormat::try_from(f.to_raw()).ok(), Some(*f));
            assert_eq!(i32::from(*f), f.to_raw());
        }
    }

    #[test]
    fn test_all_members_distinct() {
        for (i, a) in PixelFormat::ALL.iter().enumerate() {
            for b in PixelFormat::ALL[i + 1..].iter() {
                assert_ne!(a.to_raw(), b.to_raw());
            }
        }
    }

    #[test]
    fn test_all_sorted() {
        for pair in PixelFormat::ALL.windows(2) {
            assert!(pair[0].to_raw() < pair[1].to_raw());
        }
    }

    #[test]
    fn test_native_values() {
        assert_eq!(PixelFormat::UNDEFINED.to_raw(), 0);
        assert_eq!(PixelFormat::Max.to_raw(), 15);
        assert_eq!(PixelFormat::Format1bppIndexed.to_raw(), 196865);
        assert_eq!(PixelFormat::Format24bppRgb.to_raw(), 137224);
        assert_eq!(PixelFormat::Format32bppArgb.to_raw(), 2498570);
        assert_eq!(PixelFormat::Format32bppPArgb.to_raw(), 925707);
        assert_eq!(PixelFormat::Format64bppArgb.to_raw(), 3424269);
    }

    #[test]
    fn test_invalid_values() {
        let highest = PixelFormat::ALL[PixelFormat::ALL.len() - 1].to_raw();
        for raw in [
            -1,
            1,
            PixelFormat::Max.to_raw() + 1,
            PixelFormat::Canonical.to_raw() + 1,
            highest + 1,
            9999,
            i32::MAX,
            i32::MIN,
        ]
        .iter()
        {
            assert!(!PixelFormat::is_valid(*raw), "{} should be invalid", raw);
            assert!(PixelFormat::try_from(*raw).is_err());
        }
    }

    #[test]
    fn test_table_matches_conversion() {
        // The lookup table and the derived conversion must agree everywhere
        // in the range where members live.
        for raw in -16..0x0040_0000 {
            assert_eq!(
                PixelFormat::is_valid(raw),
                PixelFormat::try_from(raw).is_ok(),
                "disagreement at {:#x}",
                raw
            );
        }
    }

    #[test]
    fn test_bits_per_pixel() {
        assert_eq!(PixelFormat::DontCare.bits_per_pixel(), 0);
        assert_eq!(PixelFormat::Max.bits_per_pixel(), 0);
        assert_eq!(PixelFormat::Alpha.bits_per_pixel(), 0);
        assert_eq!(PixelFormat::Format1bppIndexed.bits_per_pixel(), 1);
        assert_eq!(PixelFormat::Format4bppIndexed.bits_per_pixel(), 4);
        assert_eq!(PixelFormat::Format16bppRgb565.bits_per_pixel(), 16);
        assert_eq!(PixelFormat::Format24bppRgb.bits_per_pixel(), 24);
        assert_eq!(PixelFormat::Format32bppArgb.bits_per_pixel(), 32);
        assert_eq!(PixelFormat::Format48bppRgb.bits_per_pixel(), 48);
        assert_eq!(PixelFormat::Format64bppPArgb.bits_per_pixel(), 64);
    }

    #[test]
    fn test_minimum_stride() {
        assert_eq!(PixelFormat::Format1bppIndexed.minimum_stride(9), 2);
        assert_eq!(PixelFormat::Format4bppIndexed.minimum_stride(3), 2);
        assert_eq!(PixelFormat::Format24bppRgb.minimum_stride(5), 15);
        assert_eq!(PixelFormat::Format32bppArgb.minimum_stride(4), 16);
        assert_eq!(PixelFormat::DontCare.minimum_stride(100), 0);
        assert_eq!(
            PixelFormat::Format64bppArgb.minimum_stride(u32::MAX),
            u32::MAX as u64 * 8
        );
        assert_eq!(
            PixelFormat::Format1bppIndexed.minimum_stride(u32::MAX),
            (u32::MAX as u64 + 7) / 8
        );
    }

    #[test]
    fn test_raw_bits_per_pixel() {
        // 32bpp CMYK, which native subsystems use but which isn't listed.
        assert_eq!(PixelFormat::raw_bits_per_pixel(0x200F), 32);
        assert_eq!(PixelFormat::raw_bits_per_pixel(-1), 0xff);
        for f in PixelFormat::ALL.iter() {
            assert_eq!(PixelFormat::raw_bits_per_pixel(f.to_raw()), f.bits_per_pixel());
        }
    }

    #[test]
    fn test_flags() {
        assert!(PixelFormat::Format8bppIndexed.is_indexed());
        assert!(PixelFormat::Format8bppIndexed.is_gdi());
        assert!(!PixelFormat::Format8bppIndexed.has_alpha());

        assert!(PixelFormat::Format32bppArgb.has_alpha());
        assert!(PixelFormat::Format32bppArgb.is_canonical());
        assert!(!PixelFormat::Format32bppArgb.is_premultiplied());

        assert!(PixelFormat::Format64bppPArgb.is_premultiplied());
        assert!(PixelFormat::Format64bppPArgb.is_extended());
        assert!(!PixelFormat::Format64bppPArgb.is_gdi());

        assert!(PixelFormat::Format16bppGrayScale.is_extended());
        assert!(!PixelFormat::DontCare.has_alpha());
    }
}
