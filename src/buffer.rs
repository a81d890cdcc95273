//! Growable bit buffer
//!
//! A [`BitBuffer`] owns its bytes and a logical length in bits. The backing
//! vector may be longer than the logical length; finalization copies out
//! only the bytes that hold written bits.

use alloc::vec::Vec;

use crate::bits::bytes_for_bits;
use crate::log::trace;
use crate::reader::BitReader;

/// Bytes allocated beyond the requested size on every growth
pub const GROWTH_SLACK: usize = 4;

/// Byte storage with a bit-granular logical length
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    data: Vec<u8>,
    bit_len: usize,
}

impl BitBuffer {
    /// Create an empty buffer without allocating
    #[inline]
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            bit_len: 0,
        }
    }

    /// Create an empty buffer with `bytes` of zeroed storage
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: alloc::vec![0u8; bytes],
            bit_len: 0,
        }
    }

    /// Import existing bytes; every bit becomes part of the logical length
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let bit_len = bytes.len() * 8;
        Self {
            data: bytes,
            bit_len,
        }
    }

    /// Logical length in bits
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Logical length in bytes, rounded up
    #[inline]
    pub fn byte_len(&self) -> usize {
        bytes_for_bits(self.bit_len)
    }

    /// Size of the backing storage in bytes
    #[inline]
    pub fn capacity_bytes(&self) -> usize {
        self.data.len()
    }

    /// True when nothing has been written
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    /// Grow the backing storage so it can hold `needed_bits`.
    ///
    /// Storage is resized to the needed byte count plus [`GROWTH_SLACK`];
    /// existing bytes are kept and the storage never shrinks.
    pub fn ensure_capacity(&mut self, needed_bits: usize) {
        let needed_bytes = bytes_for_bits(needed_bits);
        if self.data.len() >= needed_bytes {
            return;
        }

        let new_len = needed_bytes + GROWTH_SLACK;
        trace!(
            old_len = self.data.len(),
            new_len,
            "growing bit buffer storage"
        );
        self.data.resize(new_len, 0);
    }

    /// Set the logical length; storage must already cover it
    #[inline]
    pub(crate) fn set_bit_len(&mut self, bit_len: usize) {
        debug_assert!(bit_len <= self.data.len() * 8);
        self.bit_len = bit_len;
    }

    /// Whole backing storage, including slack past the logical end
    #[inline]
    pub(crate) fn storage_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Bytes holding written bits
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.byte_len()]
    }

    /// Copy out exactly `byte_len()` bytes
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Consume the buffer, truncating storage to `byte_len()` bytes
    pub fn into_vec(mut self) -> Vec<u8> {
        let len = self.byte_len();
        self.data.truncate(len);
        self.data
    }

    /// Reset the logical length and zero the storage, keeping the allocation
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.bit_len = 0;
    }

    /// Reader over the written bits
    #[inline]
    pub fn reader(&self) -> BitReader<'_> {
        BitReader::from(self)
    }
}

impl From<Vec<u8>> for BitBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&[u8]> for BitBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes.to_vec())
    }
}

impl From<BitBuffer> for Vec<u8> {
    fn from(buffer: BitBuffer) -> Self {
        buffer.into_vec()
    }
}

impl AsRef<[u8]> for BitBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
