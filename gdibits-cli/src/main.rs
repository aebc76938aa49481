// For now this is just a small test bed for trying out the library crate in
// practice, driving the fake native interface the way a real GDI+ binding
// would be driven. Set RUST_LOG=trace to see the pin and lock calls.
//
// Usage: gdibits-cli [pixel_format] [width] [height]
//
// The pixel format is a native tag value, in decimal or 0x-prefixed hex.

use gdibits::interface::fake;
use gdibits::{BitmapData, ImageLockMode, Locker, PixelFormat, Rect};
use std::convert::TryFrom;
use std::process::exit;

/// Largest width or height the test bed will allocate for.
const MAX_SIDE: i32 = 0x10000;

/// Parses a decimal or `0x` hex integer, rejecting anything that doesn't fit
/// in an `i32` rather than truncating it.
fn parse_int(s: &str) -> Option<i32> {
    let v = match s.strip_prefix("0x") {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => s.parse::<i64>().ok()?,
    };
    i32::try_from(v).ok()
}

fn arg_or(args: &[String], idx: usize, default: i32) -> i32 {
    match args.get(idx) {
        Some(s) => match parse_int(s) {
            Some(v) => v,
            None => {
                eprintln!("argument {} is not a 32-bit integer: {:?}", idx, s);
                exit(2);
            }
        },
        None => default,
    }
}

fn checked_size(width: i32, height: i32) -> Option<(u32, u32)> {
    let side = 1..=MAX_SIDE;
    if side.contains(&width) && side.contains(&height) {
        Some((width as u32, height as u32))
    } else {
        None
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let raw_format = arg_or(&args, 0, PixelFormat::Format32bppArgb.to_raw());
    let width = arg_or(&args, 1, 4);
    let height = arg_or(&args, 2, 2);

    let mut template = BitmapData::new();
    let format = match template
        .set_pixel_format(raw_format)
        .and_then(|()| template.pixel_format())
    {
        Ok(format) => format,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };
    println!("Pixel format is {}", format);
    println!(
        "  {} bits per pixel, indexed={} alpha={} premultiplied={} extended={}",
        format.bits_per_pixel(),
        format.is_indexed(),
        format.has_alpha(),
        format.is_premultiplied(),
        format.is_extended()
    );

    println!(
        "BitmapData is {} bytes: width@{} height@{} stride@{} pixel_format@{} scan0@{} reserved@{}",
        std::mem::size_of::<BitmapData>(),
        BitmapData::WIDTH_OFFSET,
        BitmapData::HEIGHT_OFFSET,
        BitmapData::STRIDE_OFFSET,
        BitmapData::PIXEL_FORMAT_OFFSET,
        BitmapData::SCAN0_OFFSET,
        BitmapData::RESERVED_OFFSET,
    );

    let (width, height) = match checked_size(width, height) {
        Some(size) => size,
        None => {
            eprintln!(
                "bitmap size {}x{} is out of range, each side must be 1 to {}",
                width, height, MAX_SIDE
            );
            exit(2);
        }
    };
    log::info!("using a {}x{} fake bitmap as {}", width, height, format);
    let len = fake::Interface::required_len(format, width, height);
    let mut mem = match usize::try_from(len) {
        Ok(len) => vec![0u8; len],
        Err(_) => {
            eprintln!("a {}x{} bitmap as {} needs too much memory", width, height, format);
            exit(1);
        }
    };
    let ei = match fake::Interface::new(&mut mem, width, height, format) {
        Ok(ei) => ei,
        Err(err) => {
            eprintln!("can't create a {}x{} bitmap as {}: {:?}", width, height, format, err);
            exit(1);
        }
    };
    let mut locker = Locker::new(ei);

    // Fill the whole bitmap through the native-owned buffer.
    let mut bd = BitmapData::new();
    let r = locker.with_locked_bits(None, ImageLockMode::WRITE_ONLY, format, &mut bd, |bd| {
        for y in 0..bd.height() as usize {
            let row = unsafe { bd.row_mut(y) };
            for (i, b) in row.iter_mut().enumerate() {
                *b = (y * 0x10 + i) as u8;
            }
        }
    });
    if let Err(err) = r {
        eprintln!("write lock failed: {}", err);
        exit(1);
    }
    println!(
        "Locked for writing: {}x{} stride {} as {:#010x}",
        bd.width(),
        bd.height(),
        bd.stride(),
        bd.pixel_format_raw()
    );

    // Read the last row back into a buffer of our own.
    let rect = Rect::new(0, height as i32 - 1, width as i32, 1);
    let mut user = vec![0u8; format.minimum_stride(width) as usize];
    let mut bd = template
        .with_stride(user.len() as i32)
        .with_scan0(user.as_mut_ptr().cast());
    let mode = ImageLockMode::READ_ONLY | ImageLockMode::USER_INPUT_BUFFER;
    let r = locker.with_locked_bits(Some(&rect), mode, format, &mut bd, |bd| unsafe {
        bd.row(0).to_vec()
    });
    match r {
        Ok(row) => println!("Last row is {:02x?}", row),
        Err(err) => {
            eprintln!("read lock failed: {}", err);
            exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-1"), Some(-1));
        assert_eq!(parse_int("0x26200A"), Some(PixelFormat::Format32bppArgb.to_raw()));
        assert_eq!(parse_int("0x7fffffff"), Some(i32::MAX));
        assert_eq!(parse_int("nope"), None);
    }

    #[test]
    fn test_parse_int_rejects_out_of_range() {
        // Truncating this to 32 bits would give Format32bppArgb.
        assert_eq!(parse_int("0x10026200A"), None);
        assert_eq!(parse_int("0x80000000"), None);
        assert_eq!(parse_int("4294967296"), None);
        assert_eq!(parse_int("-2147483649"), None);
    }

    #[test]
    fn test_checked_size() {
        assert_eq!(checked_size(4, 2), Some((4, 2)));
        assert_eq!(checked_size(1, MAX_SIDE), Some((1, MAX_SIDE as u32)));
        assert_eq!(checked_size(0, 2), None);
        assert_eq!(checked_size(4, 0), None);
        assert_eq!(checked_size(-1, 2), None);
        assert_eq!(checked_size(MAX_SIDE + 1, 2), None);
    }
}
