//! Bit-granular writer
//!
//! [`BitWriter`] appends fields at the logical end of its [`BitBuffer`],
//! growing the storage as needed. Fixed-width writes return `&mut Self`, so
//! a record reads as one chain:
//!
//! ```rust
//! use bitbuf::BitWriter;
//!
//! let mut writer = BitWriter::new();
//! writer
//!     .write_bool(true)?
//!     .write_u8_bits(9, 4)?
//!     .write_ranged_i32(-100, 100, 42)?;
//! assert_eq!(writer.bit_len(), 1 + 4 + 8);
//! # Ok::<(), bitbuf::Error>(())
//! ```
//!
//! Values wider than their field are masked to the field. Signed fields
//! narrower than their type use [`bits::encode_signed`].

use alloc::vec::Vec;

#[cfg(feature = "std")]
use std::time::{SystemTime, UNIX_EPOCH};

use crate::bits;
use crate::buffer::BitBuffer;
use crate::enums::{EnumRepr, WireEnum};
use crate::error::{Error, Result};
use crate::quantize;
use crate::reader::BitReader;
use crate::varint::{self, MAX_VARINT_U32_SIZE, MAX_VARINT_U64_SIZE};

/// Writer that appends bit fields to an owned [`BitBuffer`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitWriter {
    buf: BitBuffer,
}

impl BitWriter {
    /// Create an empty writer
    #[inline]
    pub const fn new() -> Self {
        Self {
            buf: BitBuffer::new(),
        }
    }

    /// Create an empty writer with `bytes` of preallocated storage
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: BitBuffer::with_capacity(bytes),
        }
    }

    /// Continue writing after existing bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            buf: BitBuffer::from_bytes(bytes),
        }
    }

    /// Underlying buffer
    #[inline]
    pub fn buffer(&self) -> &BitBuffer {
        &self.buf
    }

    /// Consume the writer, keeping its buffer
    #[inline]
    pub fn into_buffer(self) -> BitBuffer {
        self.buf
    }

    /// Bits written so far
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.buf.bit_len()
    }

    /// Bytes written so far, rounded up
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.buf.byte_len()
    }

    /// Bytes holding written bits
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    /// Copy out the written bytes
    pub fn to_vec(&self) -> Vec<u8> {
        self.buf.to_vec()
    }

    /// Consume the writer and return the written bytes
    pub fn into_vec(self) -> Vec<u8> {
        self.buf.into_vec()
    }

    /// Reader over exactly the bits written so far
    #[inline]
    pub fn reader(&self) -> BitReader<'_> {
        self.buf.reader()
    }

    /// Reset for reuse, keeping the allocation
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Run `put` over `num_bits` at `bit_offset`, growing storage first.
    ///
    /// The logical length only ever extends, to `bit_offset + num_bits`.
    #[inline]
    fn put_at(
        &mut self,
        bit_offset: usize,
        num_bits: usize,
        put: impl FnOnce(&mut [u8], usize) -> Result<()>,
    ) -> Result<&mut Self> {
        let end = bit_offset.checked_add(num_bits).ok_or(Error::OutOfRange)?;
        self.buf.ensure_capacity(end);
        put(self.buf.storage_mut(), bit_offset)?;
        if end > self.buf.bit_len() {
            self.buf.set_bit_len(end);
        }
        Ok(self)
    }

    #[inline]
    fn put(
        &mut self,
        num_bits: usize,
        put: impl FnOnce(&mut [u8], usize) -> Result<()>,
    ) -> Result<&mut Self> {
        let at = self.buf.bit_len();
        self.put_at(at, num_bits, put)
    }

    /// Write a single bit
    #[inline]
    pub fn write_bool(&mut self, value: bool) -> Result<&mut Self> {
        self.write_u8_bits(value as u8, 1)
    }

    /// Write a u8 value (8 bits)
    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<&mut Self> {
        self.write_u8_bits(value, 8)
    }

    /// Write the low `num_bits` (1..=8) bits of a u8
    #[inline]
    pub fn write_u8_bits(&mut self, value: u8, num_bits: u32) -> Result<&mut Self> {
        bits::check_bit_count(num_bits, 8)?;
        self.put(num_bits as usize, |data, at| {
            bits::write_u8(value, num_bits, data, at)
        })
    }

    /// Write an i8 value (8 bits)
    #[inline]
    pub fn write_i8(&mut self, value: i8) -> Result<&mut Self> {
        self.write_i8_bits(value, 8)
    }

    /// Write an i8 in `num_bits` (1..=8) bits
    #[inline]
    pub fn write_i8_bits(&mut self, value: i8, num_bits: u32) -> Result<&mut Self> {
        bits::check_bit_count(num_bits, 8)?;
        let raw = bits::encode_signed(value as i64, num_bits, 8);
        self.write_u8_bits(raw as u8, num_bits)
    }

    /// Write a u16 value (16 bits)
    #[inline]
    pub fn write_u16(&mut self, value: u16) -> Result<&mut Self> {
        self.write_u16_bits(value, 16)
    }

    /// Write the low `num_bits` (1..=16) bits of a u16
    #[inline]
    pub fn write_u16_bits(&mut self, value: u16, num_bits: u32) -> Result<&mut Self> {
        bits::check_bit_count(num_bits, 16)?;
        self.put(num_bits as usize, |data, at| {
            bits::write_u16(value, num_bits, data, at)
        })
    }

    /// Write an i16 value (16 bits)
    #[inline]
    pub fn write_i16(&mut self, value: i16) -> Result<&mut Self> {
        self.write_i16_bits(value, 16)
    }

    /// Write an i16 in `num_bits` (1..=16) bits
    #[inline]
    pub fn write_i16_bits(&mut self, value: i16, num_bits: u32) -> Result<&mut Self> {
        bits::check_bit_count(num_bits, 16)?;
        let raw = bits::encode_signed(value as i64, num_bits, 16);
        self.write_u16_bits(raw as u16, num_bits)
    }

    /// Write a u32 value (32 bits)
    #[inline]
    pub fn write_u32(&mut self, value: u32) -> Result<&mut Self> {
        self.write_u32_bits(value, 32)
    }

    /// Write the low `num_bits` (1..=32) bits of a u32
    #[inline]
    pub fn write_u32_bits(&mut self, value: u32, num_bits: u32) -> Result<&mut Self> {
        bits::check_bit_count(num_bits, 32)?;
        self.put(num_bits as usize, |data, at| {
            bits::write_u32(value, num_bits, data, at)
        })
    }

    /// Write an i32 value (32 bits)
    #[inline]
    pub fn write_i32(&mut self, value: i32) -> Result<&mut Self> {
        self.write_i32_bits(value, 32)
    }

    /// Write an i32 in `num_bits` (1..=32) bits
    #[inline]
    pub fn write_i32_bits(&mut self, value: i32, num_bits: u32) -> Result<&mut Self> {
        bits::check_bit_count(num_bits, 32)?;
        let raw = bits::encode_signed(value as i64, num_bits, 32);
        self.write_u32_bits(raw as u32, num_bits)
    }

    /// Write a u64 value (64 bits)
    #[inline]
    pub fn write_u64(&mut self, value: u64) -> Result<&mut Self> {
        self.write_u64_bits(value, 64)
    }

    /// Write the low `num_bits` (1..=64) bits of a u64
    #[inline]
    pub fn write_u64_bits(&mut self, value: u64, num_bits: u32) -> Result<&mut Self> {
        bits::check_bit_count(num_bits, 64)?;
        self.put(num_bits as usize, |data, at| {
            bits::write_u64(value, num_bits, data, at)
        })
    }

    /// Write an i64 value (64 bits)
    #[inline]
    pub fn write_i64(&mut self, value: i64) -> Result<&mut Self> {
        self.write_i64_bits(value, 64)
    }

    /// Write an i64 in `num_bits` (1..=64) bits
    #[inline]
    pub fn write_i64_bits(&mut self, value: i64, num_bits: u32) -> Result<&mut Self> {
        bits::check_bit_count(num_bits, 64)?;
        let raw = bits::encode_signed(value, num_bits, 64);
        self.write_u64_bits(raw, num_bits)
    }

    /// Write an f32 as its raw 32-bit pattern
    #[inline]
    pub fn write_f32(&mut self, value: f32) -> Result<&mut Self> {
        self.write_u32(value.to_bits())
    }

    /// Write an f64 as its raw 64-bit pattern
    #[inline]
    pub fn write_f64(&mut self, value: f64) -> Result<&mut Self> {
        self.write_u64(value.to_bits())
    }

    /// Write the low `num_bits` (1..=64) bits of `value`
    #[inline]
    pub fn write_bits(&mut self, value: u64, num_bits: u32) -> Result<&mut Self> {
        self.write_u64_bits(value, num_bits)
    }

    /// Write raw bytes without length prefix
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.put(bytes.len() * 8, |data, at| bits::write_bytes(bytes, data, at))
    }

    /// Overwrite `num_bits` (1..=64) bits at an absolute bit offset
    ///
    /// Extends the logical length when the field ends past it.
    pub fn write_bits_at(
        &mut self,
        bit_offset: usize,
        value: u64,
        num_bits: u32,
    ) -> Result<&mut Self> {
        bits::check_bit_count(num_bits, 64)?;
        self.put_at(bit_offset, num_bits as usize, |data, at| {
            bits::write_u64(value, num_bits, data, at)
        })
    }

    /// Overwrite a u8 at an absolute bit offset
    #[inline]
    pub fn write_u8_at(&mut self, bit_offset: usize, value: u8) -> Result<&mut Self> {
        self.write_bits_at(bit_offset, value as u64, 8)
    }

    /// Overwrite a u16 at an absolute bit offset
    #[inline]
    pub fn write_u16_at(&mut self, bit_offset: usize, value: u16) -> Result<&mut Self> {
        self.write_bits_at(bit_offset, value as u64, 16)
    }

    /// Overwrite an i16 at an absolute bit offset
    #[inline]
    pub fn write_i16_at(&mut self, bit_offset: usize, value: i16) -> Result<&mut Self> {
        self.write_bits_at(bit_offset, value as u16 as u64, 16)
    }

    /// Overwrite a u32 at an absolute bit offset
    #[inline]
    pub fn write_u32_at(&mut self, bit_offset: usize, value: u32) -> Result<&mut Self> {
        self.write_bits_at(bit_offset, value as u64, 32)
    }

    /// Overwrite an i32 at an absolute bit offset
    #[inline]
    pub fn write_i32_at(&mut self, bit_offset: usize, value: i32) -> Result<&mut Self> {
        self.write_bits_at(bit_offset, value as u32 as u64, 32)
    }

    /// Overwrite a u64 at an absolute bit offset
    #[inline]
    pub fn write_u64_at(&mut self, bit_offset: usize, value: u64) -> Result<&mut Self> {
        self.write_bits_at(bit_offset, value, 64)
    }

    /// Overwrite an i64 at an absolute bit offset
    #[inline]
    pub fn write_i64_at(&mut self, bit_offset: usize, value: i64) -> Result<&mut Self> {
        self.write_bits_at(bit_offset, value as u64, 64)
    }

    /// Write a varint-encoded u32, returning the bytes written
    #[inline]
    pub fn write_var_u32(&mut self, value: u32) -> Result<usize> {
        let mut scratch = [0u8; MAX_VARINT_U32_SIZE];
        let len = varint::encode_u32(value, &mut scratch)?;
        self.write_bytes(&scratch[..len])?;
        Ok(len)
    }

    /// Write a varint-encoded u64, returning the bytes written
    #[inline]
    pub fn write_var_u64(&mut self, value: u64) -> Result<usize> {
        let mut scratch = [0u8; MAX_VARINT_U64_SIZE];
        let len = varint::encode_u64(value, &mut scratch)?;
        self.write_bytes(&scratch[..len])?;
        Ok(len)
    }

    /// Write a zigzag varint-encoded i32, returning the bytes written
    #[inline]
    pub fn write_var_i32(&mut self, value: i32) -> Result<usize> {
        self.write_var_u32(varint::zigzag_encode_32(value))
    }

    /// Write a zigzag varint-encoded i64, returning the bytes written
    #[inline]
    pub fn write_var_i64(&mut self, value: i64) -> Result<usize> {
        self.write_var_u64(varint::zigzag_encode_64(value))
    }

    /// Write `value` in `[min, max]` using the fewest bits that cover the range
    ///
    /// A degenerate range (`min == max`) writes nothing.
    pub fn write_ranged_i32(&mut self, min: i32, max: i32, value: i32) -> Result<&mut Self> {
        let num_bits = quantize::ranged_bits_i32(min, max)?;
        let offset = quantize::ranged_offset_i32(min, max, value)?;
        if num_bits == 0 {
            return Ok(self);
        }
        self.write_u32_bits(offset, num_bits)
    }

    /// Write `value` in `[min, max]` using the fewest bits that cover the range
    pub fn write_ranged_i64(&mut self, min: i64, max: i64, value: i64) -> Result<&mut Self> {
        let num_bits = quantize::ranged_bits_i64(min, max)?;
        let offset = quantize::ranged_offset_i64(min, max, value)?;
        if num_bits == 0 {
            return Ok(self);
        }
        self.write_u64_bits(offset, num_bits)
    }

    /// Quantize `value` in `[-1, 1]` to `num_bits` bits
    pub fn write_signed_f32(&mut self, value: f32, num_bits: u32) -> Result<&mut Self> {
        let code = quantize::quantize_signed(value, num_bits)?;
        self.write_u32_bits(code, num_bits)
    }

    /// Quantize `value` in `[0, 1]` to `num_bits` bits
    pub fn write_unit_f32(&mut self, value: f32, num_bits: u32) -> Result<&mut Self> {
        let code = quantize::quantize_unit(value, num_bits)?;
        self.write_u32_bits(code, num_bits)
    }

    /// Quantize `value` in `[min, max]` to `num_bits` bits
    pub fn write_ranged_f32(
        &mut self,
        value: f32,
        min: f32,
        max: f32,
        num_bits: u32,
    ) -> Result<&mut Self> {
        let code = quantize::quantize_ranged(value, min, max, num_bits)?;
        self.write_u32_bits(code, num_bits)
    }

    /// Write variable-length bytes with a varint length prefix
    pub fn write_blob(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        let len = u32::try_from(bytes.len()).map_err(|_| Error::OutOfRange)?;
        self.write_var_u32(len)?;
        self.write_bytes(bytes)
    }

    /// Write a UTF-8 string with a varint byte-length prefix
    ///
    /// An empty string is a single zero prefix byte.
    #[inline]
    pub fn write_str(&mut self, value: &str) -> Result<&mut Self> {
        self.write_blob(value.as_bytes())
    }

    /// Write a 16-byte identifier as-is
    #[inline]
    pub fn write_guid(&mut self, guid: &[u8; 16]) -> Result<&mut Self> {
        self.write_bytes(guid)
    }

    /// Write an integer as its shortest little-endian two's complement bytes,
    /// length-prefixed
    pub fn write_big_int(&mut self, value: i128) -> Result<&mut Self> {
        let bytes = value.to_le_bytes();
        let mut len = bytes.len();
        while len > 1 {
            let top = bytes[len - 1];
            let below_negative = bytes[len - 2] & 0x80 != 0;
            let redundant = (top == 0x00 && !below_negative) || (top == 0xFF && below_negative);
            if !redundant {
                break;
            }
            len -= 1;
        }
        self.write_blob(&bytes[..len])
    }

    /// Write whole seconds since the Unix epoch as a varint
    #[cfg(feature = "std")]
    pub fn write_epoch_seconds(&mut self, time: SystemTime) -> Result<usize> {
        let since = time.duration_since(UNIX_EPOCH).map_err(|_| Error::OutOfRange)?;
        self.write_var_u64(since.as_secs())
    }

    /// Write whole milliseconds since the Unix epoch as a varint
    #[cfg(feature = "std")]
    pub fn write_epoch_millis(&mut self, time: SystemTime) -> Result<usize> {
        let since = time.duration_since(UNIX_EPOCH).map_err(|_| Error::OutOfRange)?;
        let millis = u64::try_from(since.as_millis()).map_err(|_| Error::OutOfRange)?;
        self.write_var_u64(millis)
    }

    /// Write an enum with its representation's default encoding
    ///
    /// `u8`, `i8`, `i16` and `u16` use their natural width; wider
    /// representations use varints.
    pub fn write_enum<E: WireEnum>(&mut self, value: E) -> Result<&mut Self> {
        EnumRepr::write_natural(value.to_repr(), self)?;
        Ok(self)
    }

    /// Write an enum in exactly `num_bits` bits
    ///
    /// Fails with [`Error::UnsupportedRepr`] for `i8`, `i16` and `u16`
    /// representations.
    pub fn write_enum_bits<E: WireEnum>(&mut self, value: E, num_bits: u32) -> Result<&mut Self> {
        EnumRepr::write_bits(value.to_repr(), self, num_bits)?;
        Ok(self)
    }

    /// Write zero bits up to the next byte boundary
    pub fn pad_to_byte(&mut self) -> Result<&mut Self> {
        let pad = (8 - self.bit_len() % 8) % 8;
        if pad == 0 {
            return Ok(self);
        }
        self.write_u8_bits(0, pad as u32)
    }

    /// Write `num_bits` zero bits
    pub fn write_pad_bits(&mut self, num_bits: usize) -> Result<&mut Self> {
        let mut remaining = num_bits;
        while remaining > 0 {
            let chunk = remaining.min(64);
            self.write_bits(0, chunk as u32)?;
            remaining -= chunk;
        }
        Ok(self)
    }

    /// Append the written bits of another buffer
    ///
    /// The source bytes are copied whole, then the length is pulled back over
    /// the unused tail of the source's last byte.
    pub fn write_buffer(&mut self, other: &BitBuffer) -> Result<&mut Self> {
        self.write_bytes(other.as_bytes())?;
        let tail = other.bit_len() % 8;
        if tail != 0 {
            let len = self.buf.bit_len() - (8 - tail);
            self.buf.set_bit_len(len);
        }
        Ok(self)
    }
}

impl From<BitBuffer> for BitWriter {
    fn from(buf: BitBuffer) -> Self {
        Self { buf }
    }
}

impl From<BitWriter> for BitBuffer {
    fn from(writer: BitWriter) -> Self {
        writer.buf
    }
}

impl From<BitWriter> for Vec<u8> {
    fn from(writer: BitWriter) -> Self {
        writer.into_vec()
    }
}

impl AsRef<[u8]> for BitWriter {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
