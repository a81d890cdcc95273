//! Bit-level read and write primitives over byte slices
//!
//! Bits are addressed LSB-first: bit offset 0 is the low bit of the first
//! byte. Values wider than a byte are composed little-endian, so a
//! byte-aligned 32-bit field holds exactly `u32::to_le_bytes`.
//!
//! Every write touches only the `bits` bits of its span. Bits of a partially
//! covered byte that lie outside the span are left as they were.

use crate::error::{Error, Result};

/// Number of bytes needed to hold `bits` bits
#[inline]
pub const fn bytes_for_bits(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// Validate that `bits` lies in `1..=max`
#[inline]
pub fn check_bit_count(bits: u32, max: u32) -> Result<()> {
    if bits == 0 || bits > max {
        return Err(Error::InvalidBitCount);
    }
    Ok(())
}

#[inline]
fn check_span(data: &[u8], bits: usize, bit_offset: usize) -> Result<()> {
    if bit_offset
        .checked_add(bits)
        .map_or(true, |end| end > data.len() * 8)
    {
        return Err(Error::ShortBuffer);
    }
    Ok(())
}

#[inline]
const fn low_mask(bits: u32) -> u8 {
    ((1u16 << bits) - 1) as u8
}

#[inline]
fn splice_read(data: &[u8], bits: u32, bit_offset: usize) -> u8 {
    let idx = bit_offset / 8;
    let shift = (bit_offset % 8) as u32;
    let in_first = 8 - shift;

    let first = data[idx] >> shift;
    if bits <= in_first {
        return first & low_mask(bits);
    }

    let second = data[idx + 1] & low_mask(bits - in_first);
    first | (second << in_first)
}

#[inline]
fn splice_write(value: u8, bits: u32, data: &mut [u8], bit_offset: usize) {
    let value = value & low_mask(bits);
    let idx = bit_offset / 8;
    let shift = (bit_offset % 8) as u32;
    let in_first = 8 - shift;

    if bits <= in_first {
        let mask = low_mask(bits) << shift;
        data[idx] = (data[idx] & !mask) | (value << shift);
        return;
    }

    let first_mask = low_mask(in_first) << shift;
    data[idx] = (data[idx] & !first_mask) | (value << shift);

    let rest_mask = low_mask(bits - in_first);
    data[idx + 1] = (data[idx + 1] & !rest_mask) | (value >> in_first);
}

#[inline]
fn read_wide(data: &[u8], bits: u32, bit_offset: usize) -> u64 {
    if bit_offset % 8 == 0 && bits % 8 == 0 {
        let start = bit_offset / 8;
        let len = (bits / 8) as usize;
        let mut raw = [0u8; 8];
        raw[..len].copy_from_slice(&data[start..start + len]);
        return u64::from_le_bytes(raw);
    }

    let mut value = 0u64;
    let mut done = 0u32;
    while done < bits {
        let chunk = (bits - done).min(8);
        let byte = splice_read(data, chunk, bit_offset + done as usize);
        value |= (byte as u64) << done;
        done += chunk;
    }
    value
}

#[inline]
fn write_wide(value: u64, bits: u32, data: &mut [u8], bit_offset: usize) {
    if bit_offset % 8 == 0 && bits % 8 == 0 {
        let start = bit_offset / 8;
        let len = (bits / 8) as usize;
        data[start..start + len].copy_from_slice(&value.to_le_bytes()[..len]);
        return;
    }

    let mut done = 0u32;
    while done < bits {
        let chunk = (bits - done).min(8);
        splice_write((value >> done) as u8, chunk, data, bit_offset + done as usize);
        done += chunk;
    }
}

/// Read up to 64 bits without checking the span
///
/// Indexing past the end of `data` panics. The width is only asserted in
/// debug builds.
#[inline]
pub(crate) fn read_bits_unchecked(data: &[u8], bits: u32, bit_offset: usize) -> u64 {
    debug_assert!(bits <= 64, "unchecked read wider than 64 bits");
    read_wide(data, bits, bit_offset)
}

/// Read an unsigned value of 1..=8 bits at `bit_offset`
#[inline]
pub fn read_u8(data: &[u8], bits: u32, bit_offset: usize) -> Result<u8> {
    check_bit_count(bits, 8)?;
    check_span(data, bits as usize, bit_offset)?;
    Ok(splice_read(data, bits, bit_offset))
}

/// Read an unsigned value of 1..=16 bits at `bit_offset`
#[inline]
pub fn read_u16(data: &[u8], bits: u32, bit_offset: usize) -> Result<u16> {
    check_bit_count(bits, 16)?;
    check_span(data, bits as usize, bit_offset)?;
    Ok(read_wide(data, bits, bit_offset) as u16)
}

/// Read an unsigned value of 1..=32 bits at `bit_offset`
#[inline]
pub fn read_u32(data: &[u8], bits: u32, bit_offset: usize) -> Result<u32> {
    check_bit_count(bits, 32)?;
    check_span(data, bits as usize, bit_offset)?;
    Ok(read_wide(data, bits, bit_offset) as u32)
}

/// Read an unsigned value of 1..=64 bits at `bit_offset`
#[inline]
pub fn read_u64(data: &[u8], bits: u32, bit_offset: usize) -> Result<u64> {
    check_bit_count(bits, 64)?;
    check_span(data, bits as usize, bit_offset)?;
    Ok(read_wide(data, bits, bit_offset))
}

/// Write the low `bits` (1..=8) bits of `value` at `bit_offset`
#[inline]
pub fn write_u8(value: u8, bits: u32, data: &mut [u8], bit_offset: usize) -> Result<()> {
    check_bit_count(bits, 8)?;
    check_span(data, bits as usize, bit_offset)?;
    splice_write(value, bits, data, bit_offset);
    Ok(())
}

/// Write the low `bits` (1..=16) bits of `value` at `bit_offset`
#[inline]
pub fn write_u16(value: u16, bits: u32, data: &mut [u8], bit_offset: usize) -> Result<()> {
    check_bit_count(bits, 16)?;
    check_span(data, bits as usize, bit_offset)?;
    write_wide(value as u64, bits, data, bit_offset);
    Ok(())
}

/// Write the low `bits` (1..=32) bits of `value` at `bit_offset`
#[inline]
pub fn write_u32(value: u32, bits: u32, data: &mut [u8], bit_offset: usize) -> Result<()> {
    check_bit_count(bits, 32)?;
    check_span(data, bits as usize, bit_offset)?;
    write_wide(value as u64, bits, data, bit_offset);
    Ok(())
}

/// Write the low `bits` (1..=64) bits of `value` at `bit_offset`
#[inline]
pub fn write_u64(value: u64, bits: u32, data: &mut [u8], bit_offset: usize) -> Result<()> {
    check_bit_count(bits, 64)?;
    check_span(data, bits as usize, bit_offset)?;
    write_wide(value, bits, data, bit_offset);
    Ok(())
}

/// Fill `out` with whole bytes starting at `bit_offset`
pub fn read_bytes(data: &[u8], bit_offset: usize, out: &mut [u8]) -> Result<()> {
    check_span(data, out.len() * 8, bit_offset)?;

    if bit_offset % 8 == 0 {
        let start = bit_offset / 8;
        out.copy_from_slice(&data[start..start + out.len()]);
        return Ok(());
    }

    for (i, byte) in out.iter_mut().enumerate() {
        *byte = splice_read(data, 8, bit_offset + i * 8);
    }
    Ok(())
}

/// Write every byte of `src` starting at `bit_offset`
pub fn write_bytes(src: &[u8], data: &mut [u8], bit_offset: usize) -> Result<()> {
    check_span(data, src.len() * 8, bit_offset)?;

    if bit_offset % 8 == 0 {
        let start = bit_offset / 8;
        data[start..start + src.len()].copy_from_slice(src);
        return Ok(());
    }

    for (i, &byte) in src.iter().enumerate() {
        splice_write(byte, 8, data, bit_offset + i * 8);
    }
    Ok(())
}

/// Map a signed value onto a `bits`-wide field of a `width`-bit integer.
///
/// At full width the field holds the two's complement bits. Narrower fields
/// use the top field bit as a sign indicator and store `-value - 1` below it
/// for negative values.
#[inline]
pub const fn encode_signed(value: i64, bits: u32, width: u32) -> u64 {
    if bits >= width {
        return value as u64;
    }

    let sign_bit = 1u64 << (bits - 1);
    if value < 0 {
        (!value) as u64 | sign_bit
    } else {
        value as u64 & !sign_bit
    }
}

/// Inverse of [`encode_signed`] for a field read back as `raw`
#[inline]
pub const fn decode_signed(raw: u64, bits: u32, width: u32) -> i64 {
    if bits >= width {
        let shift = 64 - width;
        return ((raw << shift) as i64) >> shift;
    }

    let sign_bit = 1u64 << (bits - 1);
    if raw & sign_bit == 0 {
        return raw as i64;
    }
    !((raw & (sign_bit - 1)) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lsb_first_order() {
        let mut data = [0u8; 1];
        for (i, bit) in [1u8, 0, 1, 0, 1, 0, 1, 0].iter().enumerate() {
            write_u8(*bit, 1, &mut data, i).unwrap();
        }
        assert_eq!(data[0], 0b0101_0101);
        assert_eq!(read_u8(&data, 1, 0).unwrap(), 1);
        assert_eq!(read_u8(&data, 1, 1).unwrap(), 0);
    }

    #[test]
    fn test_cross_boundary_13_bits() {
        let mut data = [0xFFu8; 5];
        write_u16(0x1ABC, 13, &mut data, 5).unwrap();
        write_u16(0x0123, 13, &mut data, 18).unwrap();

        assert_eq!(read_u16(&data, 13, 5).unwrap(), 0x1ABC);
        assert_eq!(read_u16(&data, 13, 18).unwrap(), 0x0123);

        // bits [0, 5) and [31, 40) untouched
        assert_eq!(data[0] & 0b1_1111, 0b1_1111);
        assert_eq!(data[3] & 0x80, 0x80);
        assert_eq!(data[4], 0xFF);
    }

    #[test]
    fn test_write_preserves_neighbours() {
        let mut data = [0xFFu8; 2];
        write_u8(0, 4, &mut data, 6).unwrap();
        assert_eq!(data, [0b0011_1111, 0b1111_1100]);
    }

    #[test]
    fn test_aligned_matches_le_bytes() {
        let mut data = [0u8; 8];
        write_u32(0xDEAD_BEEF, 32, &mut data, 0).unwrap();
        assert_eq!(&data[..4], &0xDEAD_BEEFu32.to_le_bytes());
        write_u32(0x0102_0304, 32, &mut data, 32).unwrap();
        assert_eq!(read_u64(&data, 64, 0).unwrap(), 0x0102_0304_DEAD_BEEF);
    }

    #[test]
    fn test_aligned_and_spliced_agree() {
        let value = 0x0123_4567_89AB_CDEFu64;
        let mut aligned = [0u8; 10];
        let mut shifted = [0u8; 10];
        write_u64(value, 64, &mut aligned, 8).unwrap();
        write_u64(value, 64, &mut shifted, 3).unwrap();

        assert_eq!(read_u64(&aligned, 64, 8).unwrap(), value);
        assert_eq!(read_u64(&shifted, 64, 3).unwrap(), value);
        // same low 56 bits regardless of offset
        assert_eq!(read_u64(&shifted, 56, 3).unwrap(), read_u64(&aligned, 56, 8).unwrap());
    }

    #[test]
    fn test_bytes_unaligned() {
        let mut data = [0u8; 4];
        write_bytes(b"abc", &mut data, 3).unwrap();
        let mut out = [0u8; 3];
        read_bytes(&data, 3, &mut out).unwrap();
        assert_eq!(&out, b"abc");
    }

    #[test]
    fn test_bit_count_bounds() {
        let mut data = [0u8; 16];
        assert_eq!(write_u8(1, 0, &mut data, 0), Err(Error::InvalidBitCount));
        assert_eq!(write_u8(1, 9, &mut data, 0), Err(Error::InvalidBitCount));
        assert_eq!(read_u16(&data, 17, 0), Err(Error::InvalidBitCount));
        assert_eq!(read_u32(&data, 33, 0), Err(Error::InvalidBitCount));
        assert_eq!(read_u64(&data, 65, 0), Err(Error::InvalidBitCount));
    }

    #[test]
    fn test_span_out_of_bounds() {
        let mut data = [0u8; 2];
        assert_eq!(read_u16(&data, 16, 1), Err(Error::ShortBuffer));
        assert_eq!(write_u8(0, 8, &mut data, 9), Err(Error::ShortBuffer));
        assert_eq!(write_bytes(b"xyz", &mut data, 0), Err(Error::ShortBuffer));
        assert_eq!(read_u8(&data, 8, usize::MAX), Err(Error::ShortBuffer));
    }

    #[test]
    fn test_signed_field_mapping() {
        // narrower than width: sign indicator + (-v - 1)
        assert_eq!(encode_signed(-1, 8, 32), 0x80);
        assert_eq!(encode_signed(-128, 8, 32), 0xFF);
        assert_eq!(encode_signed(127, 8, 32), 0x7F);
        assert_eq!(decode_signed(0x80, 8, 32), -1);
        assert_eq!(decode_signed(0xFF, 8, 32), -128);
        assert_eq!(decode_signed(0x7F, 8, 32), 127);

        // full width: two's complement
        assert_eq!(encode_signed(-1, 32, 32) as u32, u32::MAX);
        assert_eq!(decode_signed(u32::MAX as u64, 32, 32), -1);
        assert_eq!(decode_signed(0x8000, 16, 16), i16::MIN as i64);
    }

    #[test]
    fn test_bytes_for_bits() {
        assert_eq!(bytes_for_bits(0), 0);
        assert_eq!(bytes_for_bits(1), 1);
        assert_eq!(bytes_for_bits(8), 1);
        assert_eq!(bytes_for_bits(9), 2);
    }
}
