//! Error types for bit buffer reads and writes

/// Errors that can occur while writing to or reading from a bit buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Read requested more bits than remain before the logical end
    ReadOverflow,
    /// Bit count is zero or exceeds the width of the operation
    InvalidBitCount,
    /// Byte slice too small for the requested bit span
    ShortBuffer,
    /// Value lies outside its declared domain
    OutOfRange,
    /// Enum representation does not support the requested encoding
    UnsupportedRepr,
    /// Decoded representation has no matching enum variant
    UnknownEnumValue,
    /// String payload is not valid UTF-8
    InvalidUtf8,
    /// Invalid varint encoding
    InvalidVarint,
}

impl Error {
    /// Returns a human-readable description of the error
    pub const fn description(&self) -> &'static str {
        match self {
            Error::ReadOverflow => "read past the logical end of the buffer",
            Error::InvalidBitCount => "bit count outside the supported range",
            Error::ShortBuffer => "buffer too small for bit span",
            Error::OutOfRange => "value outside its declared domain",
            Error::UnsupportedRepr => "enum representation does not support this encoding",
            Error::UnknownEnumValue => "no enum variant for decoded value",
            Error::InvalidUtf8 => "string payload is not valid UTF-8",
            Error::InvalidVarint => "invalid varint encoding",
        }
    }
}

#[cfg(feature = "std")]
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias for bit buffer operations
pub type Result<T> = core::result::Result<T, Error>;
