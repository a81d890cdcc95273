//! Bit-granular reader
//!
//! [`BitReader`] walks a borrowed byte slice with a bit cursor, mirroring
//! every [`BitWriter`](crate::BitWriter) operation. Each `read_*` advances
//! the cursor by exactly the bits the matching write produced; each
//! `peek_*` performs the same extraction on a copy of the cursor and leaves
//! the original untouched.
//!
//! Reads never cross the logical length given at construction, even when
//! the backing slice has bits to spare in its last byte.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

#[cfg(feature = "std")]
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::bits;
use crate::buffer::BitBuffer;
use crate::enums::{EnumRepr, WireEnum};
use crate::error::{Error, Result};
use crate::log::debug;
use crate::quantize;
use crate::varint::{self, MAX_VARINT_U32_SIZE, MAX_VARINT_U64_SIZE};

/// Forward-only bit cursor over a byte slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_len: usize,
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Reader over every bit of `data`
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_len: data.len() * 8,
            pos: 0,
        }
    }

    /// Reader over the first `bit_len` bits of `data`
    pub fn with_bit_len(data: &'a [u8], bit_len: usize) -> Result<Self> {
        if bit_len > data.len() * 8 {
            return Err(Error::ShortBuffer);
        }
        Ok(Self {
            data,
            bit_len,
            pos: 0,
        })
    }

    /// Logical length in bits
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Current read position in bits
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor to an absolute bit position
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.bit_len {
            return Err(Error::ReadOverflow);
        }
        self.pos = pos;
        Ok(())
    }

    /// Bits left before the logical end
    #[inline]
    pub fn remaining_bits(&self) -> usize {
        self.bit_len - self.pos
    }

    /// Check if cursor is at end
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bit_len
    }

    /// Skip bits in the cursor
    #[inline]
    pub fn skip_bits(&mut self, num_bits: usize) -> Result<()> {
        self.claim(num_bits)?;
        Ok(())
    }

    /// Skip to the next byte boundary, stopping at the logical end
    pub fn align_to_byte(&mut self) {
        let aligned = bits::bytes_for_bits(self.pos) * 8;
        self.pos = aligned.min(self.bit_len);
    }

    /// Run `read` against a copy of the cursor; `self` does not move.
    #[inline]
    pub fn peek<T>(&self, read: impl FnOnce(&mut BitReader<'a>) -> Result<T>) -> Result<T> {
        let mut scratch = *self;
        read(&mut scratch)
    }

    /// Run `read` against a copy and commit the new position only on success
    #[inline]
    fn atomically<T>(&mut self, read: impl FnOnce(&mut BitReader<'a>) -> Result<T>) -> Result<T> {
        let mut scratch = *self;
        let value = read(&mut scratch)?;
        *self = scratch;
        Ok(value)
    }

    /// Reserve `num_bits` and return the offset they start at
    #[inline]
    fn claim(&mut self, num_bits: usize) -> Result<usize> {
        if num_bits > self.remaining_bits() {
            debug!(
                requested = num_bits,
                remaining = self.remaining_bits(),
                "read past logical end"
            );
            return Err(Error::ReadOverflow);
        }
        let at = self.pos;
        self.pos += num_bits;
        Ok(at)
    }

    /// Read `num_bits` (0..=64) without checking against the logical length.
    ///
    /// For input already known to be well formed. Bits past the logical end
    /// but inside the slice are returned as stored; past the slice this
    /// panics. Widths above 64 trip a debug assertion.
    #[inline]
    pub fn read_bits_unchecked(&mut self, num_bits: u32) -> u64 {
        debug_assert!(num_bits <= 64, "unchecked read wider than 64 bits");
        let value = bits::read_bits_unchecked(self.data, num_bits, self.pos);
        self.pos += num_bits as usize;
        value
    }

    /// Read a single bit
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8_bits(1)? != 0)
    }

    /// Read a u8 value (8 bits)
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_u8_bits(8)
    }

    /// Read a u8 from `num_bits` (1..=8) bits
    #[inline]
    pub fn read_u8_bits(&mut self, num_bits: u32) -> Result<u8> {
        bits::check_bit_count(num_bits, 8)?;
        let at = self.claim(num_bits as usize)?;
        bits::read_u8(self.data, num_bits, at)
    }

    /// Read an i8 value (8 bits)
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_i8_bits(8)
    }

    /// Read an i8 from `num_bits` (1..=8) bits
    #[inline]
    pub fn read_i8_bits(&mut self, num_bits: u32) -> Result<i8> {
        let raw = self.read_u8_bits(num_bits)?;
        Ok(bits::decode_signed(raw as u64, num_bits, 8) as i8)
    }

    /// Read a u16 value (16 bits)
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_u16_bits(16)
    }

    /// Read a u16 from `num_bits` (1..=16) bits
    #[inline]
    pub fn read_u16_bits(&mut self, num_bits: u32) -> Result<u16> {
        bits::check_bit_count(num_bits, 16)?;
        let at = self.claim(num_bits as usize)?;
        bits::read_u16(self.data, num_bits, at)
    }

    /// Read an i16 value (16 bits)
    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_i16_bits(16)
    }

    /// Read an i16 from `num_bits` (1..=16) bits
    #[inline]
    pub fn read_i16_bits(&mut self, num_bits: u32) -> Result<i16> {
        let raw = self.read_u16_bits(num_bits)?;
        Ok(bits::decode_signed(raw as u64, num_bits, 16) as i16)
    }

    /// Read a u32 value (32 bits)
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_u32_bits(32)
    }

    /// Read a u32 from `num_bits` (1..=32) bits
    #[inline]
    pub fn read_u32_bits(&mut self, num_bits: u32) -> Result<u32> {
        bits::check_bit_count(num_bits, 32)?;
        let at = self.claim(num_bits as usize)?;
        bits::read_u32(self.data, num_bits, at)
    }

    /// Read an i32 value (32 bits)
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_i32_bits(32)
    }

    /// Read an i32 from `num_bits` (1..=32) bits
    #[inline]
    pub fn read_i32_bits(&mut self, num_bits: u32) -> Result<i32> {
        let raw = self.read_u32_bits(num_bits)?;
        Ok(bits::decode_signed(raw as u64, num_bits, 32) as i32)
    }

    /// Read a u64 value (64 bits)
    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_u64_bits(64)
    }

    /// Read a u64 from `num_bits` (1..=64) bits
    #[inline]
    pub fn read_u64_bits(&mut self, num_bits: u32) -> Result<u64> {
        bits::check_bit_count(num_bits, 64)?;
        let at = self.claim(num_bits as usize)?;
        bits::read_u64(self.data, num_bits, at)
    }

    /// Read an i64 value (64 bits)
    #[inline]
    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_i64_bits(64)
    }

    /// Read an i64 from `num_bits` (1..=64) bits
    #[inline]
    pub fn read_i64_bits(&mut self, num_bits: u32) -> Result<i64> {
        let raw = self.read_u64_bits(num_bits)?;
        Ok(bits::decode_signed(raw, num_bits, 64))
    }

    /// Read an f32 from its raw 32-bit pattern
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Read an f64 from its raw 64-bit pattern
    #[inline]
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Read `num_bits` (1..=64) bits as an unsigned value
    #[inline]
    pub fn read_bits(&mut self, num_bits: u32) -> Result<u64> {
        self.read_u64_bits(num_bits)
    }

    /// Fill `out` with raw bytes
    pub fn read_bytes_into(&mut self, out: &mut [u8]) -> Result<()> {
        let at = self.claim(out.len() * 8)?;
        bits::read_bytes(self.data, at, out)
    }

    /// Read `len` raw bytes without length prefix
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        if len > self.remaining_bits() / 8 {
            debug!(len, remaining = self.remaining_bits(), "byte read past logical end");
            return Err(Error::ReadOverflow);
        }
        let mut out = vec![0u8; len];
        self.read_bytes_into(&mut out)?;
        Ok(out)
    }

    /// Accumulate base-128 groups until a byte without the continuation bit.
    ///
    /// Input that ends mid-value yields whatever was accumulated, but at
    /// least one group must be present: a varint starting with fewer than
    /// 8 bits left is an [`Error::ReadOverflow`]. More than `max_groups`
    /// groups is an [`Error::InvalidVarint`].
    fn read_var_raw(&mut self, max_groups: usize) -> Result<u64> {
        self.atomically(|r| {
            let mut result = 0u64;
            let mut shift = 0u32;

            for group in 0..max_groups {
                if r.remaining_bits() < 8 {
                    if group == 0 {
                        debug!(remaining = r.remaining_bits(), "varint starts at logical end");
                        return Err(Error::ReadOverflow);
                    }
                    debug!(partial = result, "varint truncated at logical end");
                    return Ok(result);
                }

                let byte = r.read_u8()?;
                result |= ((byte & 0x7F) as u64) << shift;

                if byte & 0x80 == 0 {
                    return Ok(result);
                }

                shift += 7;
            }

            Err(Error::InvalidVarint)
        })
    }

    /// Read a varint-encoded u32
    #[inline]
    pub fn read_var_u32(&mut self) -> Result<u32> {
        Ok(self.read_var_raw(MAX_VARINT_U32_SIZE)? as u32)
    }

    /// Read a varint-encoded u64
    #[inline]
    pub fn read_var_u64(&mut self) -> Result<u64> {
        self.read_var_raw(MAX_VARINT_U64_SIZE)
    }

    /// Read a zigzag varint-encoded i32
    #[inline]
    pub fn read_var_i32(&mut self) -> Result<i32> {
        Ok(varint::zigzag_decode_32(self.read_var_u32()?))
    }

    /// Read a zigzag varint-encoded i64
    #[inline]
    pub fn read_var_i64(&mut self) -> Result<i64> {
        Ok(varint::zigzag_decode_64(self.read_var_u64()?))
    }

    /// Read a value written by [`BitWriter::write_ranged_i32`](crate::BitWriter::write_ranged_i32)
    pub fn read_ranged_i32(&mut self, min: i32, max: i32) -> Result<i32> {
        let num_bits = quantize::ranged_bits_i32(min, max)?;
        if num_bits == 0 {
            return Ok(min);
        }
        let offset = self.read_u32_bits(num_bits)?;
        Ok(min.wrapping_add(offset as i32))
    }

    /// Read a value written by [`BitWriter::write_ranged_i64`](crate::BitWriter::write_ranged_i64)
    pub fn read_ranged_i64(&mut self, min: i64, max: i64) -> Result<i64> {
        let num_bits = quantize::ranged_bits_i64(min, max)?;
        if num_bits == 0 {
            return Ok(min);
        }
        let offset = self.read_u64_bits(num_bits)?;
        Ok(min.wrapping_add(offset as i64))
    }

    /// Read a quantized float in `[-1, 1]`
    pub fn read_signed_f32(&mut self, num_bits: u32) -> Result<f32> {
        let code = self.read_u32_bits(num_bits)?;
        quantize::dequantize_signed(code, num_bits)
    }

    /// Read a quantized float in `[0, 1]`
    pub fn read_unit_f32(&mut self, num_bits: u32) -> Result<f32> {
        let code = self.read_u32_bits(num_bits)?;
        quantize::dequantize_unit(code, num_bits)
    }

    /// Read a quantized float in `[min, max]`
    pub fn read_ranged_f32(&mut self, min: f32, max: f32, num_bits: u32) -> Result<f32> {
        let code = self.read_u32_bits(num_bits)?;
        quantize::dequantize_ranged(code, min, max, num_bits)
    }

    /// Read variable-length bytes with a varint length prefix
    ///
    /// A missing prefix at the logical end is an [`Error::ReadOverflow`].
    pub fn read_blob(&mut self) -> Result<Vec<u8>> {
        self.atomically(|r| {
            let len = r.read_var_u32()? as usize;
            r.read_bytes(len)
        })
    }

    /// Read a length-prefixed UTF-8 string
    ///
    /// A missing prefix at the logical end is an [`Error::ReadOverflow`].
    pub fn read_string(&mut self) -> Result<String> {
        self.atomically(|r| {
            let bytes = r.read_blob()?;
            String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
        })
    }

    /// Read a 16-byte identifier
    pub fn read_guid(&mut self) -> Result<[u8; 16]> {
        let mut guid = [0u8; 16];
        self.read_bytes_into(&mut guid)?;
        Ok(guid)
    }

    /// Read an integer written by [`BitWriter::write_big_int`](crate::BitWriter::write_big_int)
    pub fn read_big_int(&mut self) -> Result<i128> {
        self.atomically(|r| {
            let bytes = r.read_blob()?;
            if bytes.len() > 16 {
                debug!(len = bytes.len(), "big integer wider than 128 bits");
                return Err(Error::OutOfRange);
            }
            let fill = match bytes.last() {
                Some(top) if top & 0x80 != 0 => 0xFF,
                _ => 0x00,
            };
            let mut raw = [fill; 16];
            raw[..bytes.len()].copy_from_slice(&bytes);
            Ok(i128::from_le_bytes(raw))
        })
    }

    /// Read whole seconds since the Unix epoch
    #[cfg(feature = "std")]
    pub fn read_epoch_seconds(&mut self) -> Result<SystemTime> {
        let secs = self.read_var_u64()?;
        UNIX_EPOCH
            .checked_add(Duration::from_secs(secs))
            .ok_or(Error::OutOfRange)
    }

    /// Read whole milliseconds since the Unix epoch
    #[cfg(feature = "std")]
    pub fn read_epoch_millis(&mut self) -> Result<SystemTime> {
        let millis = self.read_var_u64()?;
        UNIX_EPOCH
            .checked_add(Duration::from_millis(millis))
            .ok_or(Error::OutOfRange)
    }

    /// Read an enum written by [`BitWriter::write_enum`](crate::BitWriter::write_enum)
    pub fn read_enum<E: WireEnum>(&mut self) -> Result<E> {
        self.atomically(|r| {
            let repr = <E::Repr as EnumRepr>::read_natural(r)?;
            E::from_repr(repr).ok_or(Error::UnknownEnumValue)
        })
    }

    /// Read an enum written by [`BitWriter::write_enum_bits`](crate::BitWriter::write_enum_bits)
    pub fn read_enum_bits<E: WireEnum>(&mut self, num_bits: u32) -> Result<E> {
        self.atomically(|r| {
            let repr = <E::Repr as EnumRepr>::read_bits(r, num_bits)?;
            E::from_repr(repr).ok_or(Error::UnknownEnumValue)
        })
    }

    /// Peek a single bit
    #[inline]
    pub fn peek_bool(&self) -> Result<bool> {
        self.peek(|r| r.read_bool())
    }

    /// Peek a u8 value
    #[inline]
    pub fn peek_u8(&self) -> Result<u8> {
        self.peek(|r| r.read_u8())
    }

    /// Peek a u8 from `num_bits` bits
    #[inline]
    pub fn peek_u8_bits(&self, num_bits: u32) -> Result<u8> {
        self.peek(|r| r.read_u8_bits(num_bits))
    }

    /// Peek an i8 value
    #[inline]
    pub fn peek_i8(&self) -> Result<i8> {
        self.peek(|r| r.read_i8())
    }

    /// Peek an i8 from `num_bits` bits
    #[inline]
    pub fn peek_i8_bits(&self, num_bits: u32) -> Result<i8> {
        self.peek(|r| r.read_i8_bits(num_bits))
    }

    /// Peek a u16 value
    #[inline]
    pub fn peek_u16(&self) -> Result<u16> {
        self.peek(|r| r.read_u16())
    }

    /// Peek a u16 from `num_bits` bits
    #[inline]
    pub fn peek_u16_bits(&self, num_bits: u32) -> Result<u16> {
        self.peek(|r| r.read_u16_bits(num_bits))
    }

    /// Peek an i16 value
    #[inline]
    pub fn peek_i16(&self) -> Result<i16> {
        self.peek(|r| r.read_i16())
    }

    /// Peek an i16 from `num_bits` bits
    #[inline]
    pub fn peek_i16_bits(&self, num_bits: u32) -> Result<i16> {
        self.peek(|r| r.read_i16_bits(num_bits))
    }

    /// Peek a u32 value
    #[inline]
    pub fn peek_u32(&self) -> Result<u32> {
        self.peek(|r| r.read_u32())
    }

    /// Peek a u32 from `num_bits` bits
    #[inline]
    pub fn peek_u32_bits(&self, num_bits: u32) -> Result<u32> {
        self.peek(|r| r.read_u32_bits(num_bits))
    }

    /// Peek an i32 value
    #[inline]
    pub fn peek_i32(&self) -> Result<i32> {
        self.peek(|r| r.read_i32())
    }

    /// Peek an i32 from `num_bits` bits
    #[inline]
    pub fn peek_i32_bits(&self, num_bits: u32) -> Result<i32> {
        self.peek(|r| r.read_i32_bits(num_bits))
    }

    /// Peek a u64 value
    #[inline]
    pub fn peek_u64(&self) -> Result<u64> {
        self.peek(|r| r.read_u64())
    }

    /// Peek a u64 from `num_bits` bits
    #[inline]
    pub fn peek_u64_bits(&self, num_bits: u32) -> Result<u64> {
        self.peek(|r| r.read_u64_bits(num_bits))
    }

    /// Peek an i64 value
    #[inline]
    pub fn peek_i64(&self) -> Result<i64> {
        self.peek(|r| r.read_i64())
    }

    /// Peek an i64 from `num_bits` bits
    #[inline]
    pub fn peek_i64_bits(&self, num_bits: u32) -> Result<i64> {
        self.peek(|r| r.read_i64_bits(num_bits))
    }

    /// Peek `num_bits` (1..=64) bits as an unsigned value
    #[inline]
    pub fn peek_bits(&self, num_bits: u32) -> Result<u64> {
        self.peek(|r| r.read_bits(num_bits))
    }

    /// Peek an f32 value
    #[inline]
    pub fn peek_f32(&self) -> Result<f32> {
        self.peek(|r| r.read_f32())
    }

    /// Peek an f64 value
    #[inline]
    pub fn peek_f64(&self) -> Result<f64> {
        self.peek(|r| r.read_f64())
    }

    /// Peek `len` raw bytes
    #[inline]
    pub fn peek_bytes(&self, len: usize) -> Result<Vec<u8>> {
        self.peek(|r| r.read_bytes(len))
    }

    /// Peek a 16-byte identifier
    #[inline]
    pub fn peek_guid(&self) -> Result<[u8; 16]> {
        self.peek(|r| r.read_guid())
    }

    /// Peek a varint-encoded u32
    #[inline]
    pub fn peek_var_u32(&self) -> Result<u32> {
        self.peek(|r| r.read_var_u32())
    }

    /// Peek a varint-encoded u64
    #[inline]
    pub fn peek_var_u64(&self) -> Result<u64> {
        self.peek(|r| r.read_var_u64())
    }

    /// Peek a zigzag varint-encoded i32
    #[inline]
    pub fn peek_var_i32(&self) -> Result<i32> {
        self.peek(|r| r.read_var_i32())
    }

    /// Peek a zigzag varint-encoded i64
    #[inline]
    pub fn peek_var_i64(&self) -> Result<i64> {
        self.peek(|r| r.read_var_i64())
    }

    /// Peek a length-prefixed blob
    #[inline]
    pub fn peek_blob(&self) -> Result<Vec<u8>> {
        self.peek(|r| r.read_blob())
    }

    /// Peek a length-prefixed string
    #[inline]
    pub fn peek_string(&self) -> Result<String> {
        self.peek(|r| r.read_string())
    }
}

impl<'a> From<&'a [u8]> for BitReader<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

impl<'a> From<&'a BitBuffer> for BitReader<'a> {
    fn from(buffer: &'a BitBuffer) -> Self {
        Self {
            data: buffer.as_bytes(),
            bit_len: buffer.bit_len(),
            pos: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::BitWriter;

    #[test]
    fn test_reader_position_tracking() {
        let data = [1, 2, 3, 4, 5, 6, 7, 8];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.remaining_bits(), 64);
        assert!(!reader.is_at_end());

        assert_eq!(reader.read_u16().unwrap(), 0x0201); // little-endian
        assert_eq!(reader.position(), 16);

        reader.skip_bits(16).unwrap();
        assert_eq!(reader.remaining_bits(), 32);

        let peeked = reader.peek_bytes(2).unwrap();
        assert_eq!(peeked, [5, 6]);
        assert_eq!(reader.remaining_bits(), 32); // peek doesn't advance

        assert_eq!(reader.read_u32().unwrap(), 0x08070605); // little-endian
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_read_overflow_leaves_cursor() {
        let data = [0xFF];
        let mut reader = BitReader::new(&data);
        reader.read_u8_bits(5).unwrap();

        assert_eq!(reader.read_u8_bits(4), Err(Error::ReadOverflow));
        assert_eq!(reader.position(), 5);
        assert_eq!(reader.read_u8_bits(3).unwrap(), 0b111);
        assert_eq!(reader.read_bool(), Err(Error::ReadOverflow));
    }

    #[test]
    fn test_logical_length_respected() {
        let data = [0xFF, 0xFF];
        let mut reader = BitReader::with_bit_len(&data, 10).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 0xFF);
        assert_eq!(reader.read_u8_bits(3), Err(Error::ReadOverflow));
        assert_eq!(reader.read_u8_bits(2).unwrap(), 0b11);

        assert_eq!(BitReader::with_bit_len(&data, 17).err(), Some(Error::ShortBuffer));
    }

    #[test]
    fn test_set_position_and_align() {
        let data = [0u8; 2];
        let mut reader = BitReader::with_bit_len(&data, 12).unwrap();
        reader.set_position(3).unwrap();
        reader.align_to_byte();
        assert_eq!(reader.position(), 8);

        reader.set_position(9).unwrap();
        reader.align_to_byte();
        assert_eq!(reader.position(), 12);
        assert_eq!(reader.set_position(13), Err(Error::ReadOverflow));
    }

    #[test]
    fn test_truncated_varint_returns_partial() {
        // continuation bit set on the last available byte
        let data = [0x81, 0x81];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_var_u32().unwrap(), 1 | (1 << 7));
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_overlong_varint_rejected() {
        let data = [0xFF; 6];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_var_u32(), Err(Error::InvalidVarint));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_peek_string_restores_cursor() {
        let mut writer = BitWriter::new();
        writer.write_bool(true).unwrap().write_str("héllo").unwrap();

        let mut reader = writer.reader();
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.peek_string().unwrap(), "héllo");
        assert_eq!(reader.peek_string().unwrap(), "héllo");
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.read_string().unwrap(), "héllo");
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_string_errors_are_atomic() {
        let mut writer = BitWriter::new();
        writer.write_var_u32(10).unwrap();
        writer.write_bytes(b"abc").unwrap();

        let mut reader = writer.reader();
        assert_eq!(reader.read_string(), Err(Error::ReadOverflow));
        assert_eq!(reader.position(), 0);

        let mut writer = BitWriter::new();
        writer.write_blob(&[0xC3, 0x28]).unwrap();
        let mut reader = writer.reader();
        assert_eq!(reader.read_string(), Err(Error::InvalidUtf8));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_big_int_too_wide() {
        let mut writer = BitWriter::new();
        writer.write_blob(&[0x01; 17]).unwrap();
        assert_eq!(writer.reader().read_big_int(), Err(Error::OutOfRange));
    }

    #[test]
    fn test_prefixed_reads_at_end_overflow() {
        let mut reader = BitReader::new(&[]);
        assert_eq!(reader.read_var_u32(), Err(Error::ReadOverflow));
        assert_eq!(reader.read_string(), Err(Error::ReadOverflow));
        assert_eq!(reader.read_blob(), Err(Error::ReadOverflow));
        assert_eq!(reader.read_big_int(), Err(Error::ReadOverflow));

        // fewer than 8 bits left is still no group at all
        let data = [0x00];
        let mut reader = BitReader::new(&data);
        reader.skip_bits(3).unwrap();
        assert_eq!(reader.peek_string(), Err(Error::ReadOverflow));
        assert_eq!(reader.read_var_u64(), Err(Error::ReadOverflow));
        assert_eq!(reader.position(), 3);
    }

    #[test]
    fn test_signed_and_raw_peeks() {
        let guid = [0x5Au8; 16];
        let mut writer = BitWriter::new();
        writer
            .write_i8_bits(-5, 4)
            .unwrap()
            .write_i16_bits(-300, 11)
            .unwrap()
            .write_i64_bits(-(1 << 40), 42)
            .unwrap()
            .write_bits(0x1F, 5)
            .unwrap()
            .write_guid(&guid)
            .unwrap();

        let mut reader = writer.reader();
        assert_eq!(reader.peek_i8_bits(4).unwrap(), -5);
        assert_eq!(reader.read_i8_bits(4).unwrap(), -5);
        assert_eq!(reader.peek_i16_bits(11).unwrap(), -300);
        assert_eq!(reader.read_i16_bits(11).unwrap(), -300);
        assert_eq!(reader.peek_i64_bits(42).unwrap(), -(1 << 40));
        assert_eq!(reader.read_i64_bits(42).unwrap(), -(1 << 40));
        assert_eq!(reader.peek_bits(5).unwrap(), 0x1F);
        assert_eq!(reader.read_bits(5).unwrap(), 0x1F);

        let pos = reader.position();
        assert_eq!(reader.peek_guid().unwrap(), guid);
        assert_eq!(reader.position(), pos);
        assert_eq!(reader.read_guid().unwrap(), guid);
        assert_eq!(reader.peek_guid(), Err(Error::ReadOverflow));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "wider than 64 bits")]
    fn test_unchecked_rejects_wide_reads_in_debug() {
        let data = [0u8; 16];
        let mut reader = BitReader::new(&data);
        reader.skip_bits(1).unwrap();
        reader.read_bits_unchecked(65);
    }

    #[test]
    fn test_unchecked_matches_checked() {
        let data = [0b1010_1100, 0b0101_0011];
        let mut fast = BitReader::new(&data);
        let mut checked = BitReader::new(&data);
        for width in [3, 7, 6] {
            assert_eq!(fast.read_bits_unchecked(width), checked.read_bits(width).unwrap());
        }
        assert_eq!(fast.position(), checked.position());
    }
}
