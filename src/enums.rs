//! Enumeration codecs keyed by the enum's integer representation
//!
//! An enum opts in through [`WireEnum`], naming its representation type.
//! The representation picks the codec at compile time:
//!
//! | Repr                       | default           | explicit bit count |
//! |----------------------------|-------------------|--------------------|
//! | `u8`                       | 8 bits            | 1..=8 bits         |
//! | `i8`, `i16`, `u16`         | natural width     | unsupported        |
//! | `i32`, `u32`, `i64`, `u64` | varint            | 1..=width bits     |
//!
//! [`wire_enum!`](crate::wire_enum) declares a fieldless enum together with
//! its [`WireEnum`] impl.

use crate::error::{Error, Result};
use crate::reader::BitReader;
use crate::writer::BitWriter;

mod sealed {
    pub trait Sealed {}
}

/// Integer type that can carry an enum on the wire
pub trait EnumRepr: Copy + sealed::Sealed {
    /// Write with the representation's default encoding
    fn write_natural(self, writer: &mut BitWriter) -> Result<()>;

    /// Write in exactly `num_bits` bits
    fn write_bits(self, writer: &mut BitWriter, num_bits: u32) -> Result<()>;

    /// Read the default encoding
    fn read_natural(reader: &mut BitReader<'_>) -> Result<Self>;

    /// Read from exactly `num_bits` bits
    fn read_bits(reader: &mut BitReader<'_>, num_bits: u32) -> Result<Self>;
}

/// Enum encoded through its integer representation
pub trait WireEnum: Sized {
    /// Underlying integer representation
    type Repr: EnumRepr;

    /// Representation of this variant
    fn to_repr(&self) -> Self::Repr;

    /// Variant for `repr`, if any
    fn from_repr(repr: Self::Repr) -> Option<Self>;
}

macro_rules! fixed_repr {
    ($ty:ty, $write:ident, $read:ident) => {
        impl sealed::Sealed for $ty {}

        impl EnumRepr for $ty {
            #[inline]
            fn write_natural(self, writer: &mut BitWriter) -> Result<()> {
                writer.$write(self).map(|_| ())
            }

            #[inline]
            fn write_bits(self, _writer: &mut BitWriter, _num_bits: u32) -> Result<()> {
                Err(Error::UnsupportedRepr)
            }

            #[inline]
            fn read_natural(reader: &mut BitReader<'_>) -> Result<Self> {
                reader.$read()
            }

            #[inline]
            fn read_bits(_reader: &mut BitReader<'_>, _num_bits: u32) -> Result<Self> {
                Err(Error::UnsupportedRepr)
            }
        }
    };
}

macro_rules! sized_repr {
    ($ty:ty, $write:ident, $write_bits:ident, $read:ident, $read_bits:ident) => {
        impl sealed::Sealed for $ty {}

        impl EnumRepr for $ty {
            #[inline]
            fn write_natural(self, writer: &mut BitWriter) -> Result<()> {
                writer.$write(self).map(|_| ())
            }

            #[inline]
            fn write_bits(self, writer: &mut BitWriter, num_bits: u32) -> Result<()> {
                writer.$write_bits(self, num_bits).map(|_| ())
            }

            #[inline]
            fn read_natural(reader: &mut BitReader<'_>) -> Result<Self> {
                reader.$read()
            }

            #[inline]
            fn read_bits(reader: &mut BitReader<'_>, num_bits: u32) -> Result<Self> {
                reader.$read_bits(num_bits)
            }
        }
    };
}

fixed_repr!(i8, write_i8, read_i8);
fixed_repr!(i16, write_i16, read_i16);
fixed_repr!(u16, write_u16, read_u16);

sized_repr!(u8, write_u8, write_u8_bits, read_u8, read_u8_bits);
sized_repr!(i32, write_var_i32, write_i32_bits, read_var_i32, read_i32_bits);
sized_repr!(u32, write_var_u32, write_u32_bits, read_var_u32, read_u32_bits);
sized_repr!(i64, write_var_i64, write_i64_bits, read_var_i64, read_i64_bits);
sized_repr!(u64, write_var_u64, write_u64_bits, read_var_u64, read_u64_bits);

/// Declare a fieldless enum with an explicit representation and implement
/// [`WireEnum`] for it.
///
/// ```rust
/// use bitbuf::{wire_enum, BitWriter};
///
/// wire_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum Channel: u8 {
///         Left = 0,
///         Right = 1,
///     }
/// }
///
/// let mut writer = BitWriter::new();
/// writer.write_enum_bits(Channel::Right, 1)?;
/// assert_eq!(writer.reader().read_enum_bits::<Channel>(1)?, Channel::Right);
/// # Ok::<(), bitbuf::Error>(())
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr($repr)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value
            ),+
        }

        impl $crate::WireEnum for $name {
            type Repr = $repr;

            fn to_repr(&self) -> $repr {
                match self {
                    $($name::$variant => $name::$variant as $repr),+
                }
            }

            fn from_repr(repr: $repr) -> ::core::option::Option<Self> {
                $(
                    if repr == $name::$variant as $repr {
                        return ::core::option::Option::Some($name::$variant);
                    }
                )+
                ::core::option::Option::None
            }
        }
    };
}
