//! Various error types returned by different components in this crate.

/// Returned when a raw value given for an enumerated argument isn't a member
/// of that enumeration.
///
/// This is the only error the record itself can produce, from
/// [`BitmapData::set_pixel_format`](crate::BitmapData::set_pixel_format), or
/// from [`BitmapData::pixel_format`](crate::BitmapData::pixel_format) when the
/// native side stored a tag outside the set.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct InvalidEnumArgument {
    /// The name of the parameter that received the value.
    pub param_name: &'static str,

    /// The rejected raw value, widened so that both signed and unsigned
    /// arguments are reported exactly.
    pub value: i64,

    /// The name of the enumeration the value was expected to belong to.
    pub enum_name: &'static str,
}

impl InvalidEnumArgument {
    pub fn new<E>(param_name: &'static str, value: i64) -> Self {
        Self {
            param_name,
            value,
            enum_name: core::any::type_name::<E>(),
        }
    }
}

impl core::fmt::Debug for InvalidEnumArgument {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InvalidEnumArgument")
            .field("param_name", &self.param_name)
            .field("value", &self.value)
            .field("enum_name", &self.enum_name)
            .finish()
    }
}

impl core::fmt::Display for InvalidEnumArgument {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "the value of argument '{}' ({}) is invalid for enum type '{}'",
            self.param_name, self.value, self.enum_name
        )
    }
}

/// A general error type for errors from the [`Locker`](crate::locking::Locker)
/// type.
#[cfg(feature = "pinning")]
#[non_exhaustive]
pub enum Error<I: crate::interface::Interface> {
    /// A raw enumeration value was rejected before calling the native
    /// subsystem.
    InvalidEnumArgument(InvalidEnumArgument),

    /// Errors reported by the native subsystem itself.
    ///
    /// The wrapped error type for this variant is the error type for whichever
    /// [`Interface`](crate::interface::Interface) implementation you are using.
    /// It's passed through exactly as the interface returned it.
    Interface(I::Error),
}

#[cfg(feature = "pinning")]
impl<I: crate::interface::Interface> Error<I> {
    pub fn interface_result<R>(r: Result<R, I::Error>) -> Result<R, Self> {
        match r {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::Interface(e)),
        }
    }
}

#[cfg(feature = "pinning")]
impl<I> core::fmt::Debug for Error<I>
where
    I: crate::interface::Interface,
    I::Error: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::result::Result<(), core::fmt::Error> {
        match self {
            Error::InvalidEnumArgument(e) => f.debug_tuple("InvalidEnumArgument").field(e).finish(),
            Error::Interface(e) => f.debug_tuple("Interface").field(e).finish(),
        }
    }
}

#[cfg(feature = "pinning")]
impl<I> core::fmt::Display for Error<I>
where
    I: crate::interface::Interface,
    I::Error: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::result::Result<(), core::fmt::Error> {
        match self {
            Error::InvalidEnumArgument(e) => write!(f, "{}", e),
            Error::Interface(e) => write!(f, "native call failed: {:?}", e),
        }
    }
}

#[cfg(feature = "pinning")]
impl<I: crate::interface::Interface> From<InvalidEnumArgument> for Error<I> {
    fn from(err: InvalidEnumArgument) -> Self {
        Error::InvalidEnumArgument(err)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::PixelFormat;
    use std::format;

    #[test]
    fn test_display() {
        let err = InvalidEnumArgument::new::<PixelFormat>("value", 9999);
        assert_eq!(err.enum_name, core::any::type_name::<PixelFormat>());
        let msg = format!("{}", err);
        assert!(msg.contains("'value'"));
        assert!(msg.contains("9999"));
        assert!(msg.contains("PixelFormat"));
    }
}
