//! bitbuf: bit-granular buffers for compact binary wire and record formats
//!
//! This crate packs booleans, integers of any declared bit width, floats,
//! strings, byte blobs and enums into a contiguous byte buffer at sub-byte
//! precision, and reads them back symmetrically.
//!
//! # Bit Layout
//!
//! ```text
//!  byte 0                byte 1
//! +-----------------------+-----------------------+
//! | 7 6 5 4 3 2 1 0       | 15 14 13 12 11 10 9 8 |   <- bit offsets
//! +-----------------------+-----------------------+
//!   fields fill each byte from its low bit upward; wider
//!   values are little-endian across bytes
//! ```
//!
//! There is no header, schema or length envelope: a sequence of writes
//! replayed as the same sequence of reads reproduces the original values.
//!
//! # Features
//!
//! - Fixed-width fields of 1..=64 bits at any bit offset
//! - LEB128 varints with zigzag mapping for signed values
//! - Minimal-width ranged integers and quantized floats
//! - Length-prefixed strings and blobs, 128-bit identifiers, timestamps
//! - Enum codecs selected by the enum's integer representation
//! - Non-consuming peeks for every read
//! - `no_std` support with `alloc`
//!
//! # Example
//!
//! ```rust
//! use bitbuf::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer
//!     .write_bool(true)?
//!     .write_ranged_i32(0, 15, 14)?
//!     .write_unit_f32(0.25, 10)?
//!     .write_str("north")?;
//! writer.write_var_i64(-42)?;
//!
//! let bytes = writer.to_vec();
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.read_bool()?);
//! assert_eq!(reader.read_ranged_i32(0, 15)?, 14);
//! assert!((reader.read_unit_f32(10)? - 0.25).abs() < 1e-3);
//! assert_eq!(reader.read_string()?, "north");
//! assert_eq!(reader.read_var_i64()?, -42);
//! # Ok::<(), bitbuf::Error>(())
//! ```

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod log;

pub mod bits;
pub mod buffer;
pub mod enums;
pub mod error;
pub mod quantize;
pub mod reader;
pub mod varint;
pub mod writer;

// Re-export main types
pub use buffer::{BitBuffer, GROWTH_SLACK};
pub use enums::{EnumRepr, WireEnum};
pub use error::{Error, Result};
pub use reader::BitReader;
pub use varint::{MAX_VARINT_U32_SIZE, MAX_VARINT_U64_SIZE};
pub use writer::BitWriter;
