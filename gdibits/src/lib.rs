//! Fixed-layout bitmap data records for exchanging pixel buffers with a
//! native imaging subsystem's "lock bits" routines.
//!
//! - [`BitmapData`] is the record itself, laid out exactly as the native side
//!   expects.
//! - [`PixelFormat`] is the closed set of pixel encodings the record may
//!   carry.
//! - [`PinningMarshaller`] holds a record at a stable address for the
//!   duration of one native call.
//! - [`Locker`] makes lock and unlock calls through an [`Interface`] with the
//!   record pinned.
//!
//! The last two need the `pinning` feature, which is enabled by default.

#![no_std]

pub mod bitmap_data;
pub mod error;
pub mod interface;
pub mod pixel_format;

#[cfg(feature = "pinning")]
pub mod locking;
#[cfg(feature = "pinning")]
pub mod pinning;

pub use bitmap_data::BitmapData;
pub use error::InvalidEnumArgument;
pub use interface::{ImageLockMode, Interface, Rect};
pub use pixel_format::PixelFormat;

#[cfg(feature = "pinning")]
pub use error::Error;
#[cfg(feature = "pinning")]
pub use locking::Locker;
#[cfg(feature = "pinning")]
pub use pinning::{with_pinned, PinState, PinningMarshaller};
