//! Minimal-width ranged integers and quantized floats
//!
//! Ranged integers spend exactly `bits_to_hold(max - min)` bits on
//! `value - min`. Quantized floats map a closed interval linearly onto the
//! codes `0..=2^bits - 1`, rounding to the nearest code. Quantization is
//! lossy: the step between codes is `(max - min) / (2^bits - 1)`.

use crate::bits::check_bit_count;
use crate::error::{Error, Result};
use crate::log::debug;

/// Widest quantized float field
pub const MAX_QUANTIZE_BITS: u32 = 32;

/// Minimum number of bits needed to represent `value` (0 for 0)
#[inline]
pub const fn bits_to_hold_u32(value: u32) -> u32 {
    u32::BITS - value.leading_zeros()
}

/// Minimum number of bits needed to represent `value` (0 for 0)
#[inline]
pub const fn bits_to_hold_u64(value: u64) -> u32 {
    u64::BITS - value.leading_zeros()
}

/// Bits consumed by a ranged i32 over `[min, max]`
pub fn ranged_bits_i32(min: i32, max: i32) -> Result<u32> {
    if min > max {
        return Err(Error::OutOfRange);
    }
    Ok(bits_to_hold_u32(max.wrapping_sub(min) as u32))
}

/// Bits consumed by a ranged i64 over `[min, max]`
pub fn ranged_bits_i64(min: i64, max: i64) -> Result<u32> {
    if min > max {
        return Err(Error::OutOfRange);
    }
    Ok(bits_to_hold_u64(max.wrapping_sub(min) as u64))
}

/// Offset of `value` from `min`, checked against `[min, max]`
pub fn ranged_offset_i32(min: i32, max: i32, value: i32) -> Result<u32> {
    if value < min || value > max {
        debug!(min, max, value, "ranged integer outside domain");
        return Err(Error::OutOfRange);
    }
    Ok(value.wrapping_sub(min) as u32)
}

/// Offset of `value` from `min`, checked against `[min, max]`
pub fn ranged_offset_i64(min: i64, max: i64, value: i64) -> Result<u64> {
    if value < min || value > max {
        debug!(min, max, value, "ranged integer outside domain");
        return Err(Error::OutOfRange);
    }
    Ok(value.wrapping_sub(min) as u64)
}

#[inline]
fn max_code(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

fn quantize(unit: f64, bits: u32) -> u32 {
    let max = max_code(bits);
    // unit is in [0, 1], so truncating after +0.5 rounds to nearest
    let code = (unit * max as f64 + 0.5) as u64;
    code.min(max) as u32
}

fn dequantize(code: u32, bits: u32) -> f64 {
    code as f64 / max_code(bits) as f64
}

/// Quantize `value` in `[0, 1]` to a `bits`-wide code
pub fn quantize_unit(value: f32, bits: u32) -> Result<u32> {
    check_bit_count(bits, MAX_QUANTIZE_BITS)?;
    if !(0.0..=1.0).contains(&value) {
        debug!(value, "unit float outside [0, 1]");
        return Err(Error::OutOfRange);
    }
    Ok(quantize(value as f64, bits))
}

/// Recover a value in `[0, 1]` from its code
pub fn dequantize_unit(code: u32, bits: u32) -> Result<f32> {
    check_bit_count(bits, MAX_QUANTIZE_BITS)?;
    Ok(dequantize(code, bits) as f32)
}

/// Quantize `value` in `[-1, 1]` to a `bits`-wide code
pub fn quantize_signed(value: f32, bits: u32) -> Result<u32> {
    check_bit_count(bits, MAX_QUANTIZE_BITS)?;
    if !(-1.0..=1.0).contains(&value) {
        debug!(value, "signed float outside [-1, 1]");
        return Err(Error::OutOfRange);
    }
    Ok(quantize((value as f64 + 1.0) * 0.5, bits))
}

/// Recover a value in `[-1, 1]` from its code
pub fn dequantize_signed(code: u32, bits: u32) -> Result<f32> {
    check_bit_count(bits, MAX_QUANTIZE_BITS)?;
    Ok((dequantize(code, bits) * 2.0 - 1.0) as f32)
}

/// Quantize `value` in `[min, max]` to a `bits`-wide code
pub fn quantize_ranged(value: f32, min: f32, max: f32, bits: u32) -> Result<u32> {
    check_bit_count(bits, MAX_QUANTIZE_BITS)?;
    if !(min <= max) || !(min..=max).contains(&value) {
        debug!(value, min, max, "ranged float outside domain");
        return Err(Error::OutOfRange);
    }

    let range = max as f64 - min as f64;
    if range == 0.0 {
        return Ok(0);
    }
    let unit = ((value as f64 - min as f64) / range).clamp(0.0, 1.0);
    Ok(quantize(unit, bits))
}

/// Recover a value in `[min, max]` from its code
pub fn dequantize_ranged(code: u32, min: f32, max: f32, bits: u32) -> Result<f32> {
    check_bit_count(bits, MAX_QUANTIZE_BITS)?;
    let range = max as f64 - min as f64;
    Ok((min as f64 + range * dequantize(code, bits)) as f32)
}
