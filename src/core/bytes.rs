//! Bounds-checked, little-endian access to blob bytes
//!
//! Every view in this crate reads through a [`BlobRef`]. Reads never assume
//! host alignment, so owned, shared and memory-mapped buffers behave the same.

use crate::error::{BlobError, Result};

/// Borrowed view over the full byte buffer of one blob.
///
/// Offsets passed to the read methods are absolute (from the blob base).
#[derive(Clone, Copy, Debug)]
pub struct BlobRef<'a> {
    data: &'a [u8],
}

impl<'a> BlobRef<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BlobRef { data }
    }

    /// Total length of the blob in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The underlying bytes.
    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// Check that `[offset, offset + size)` lies within the blob.
    pub fn check(&self, offset: usize, size: usize) -> Result<()> {
        match offset.checked_add(size) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(BlobError::OutOfBounds {
                offset: offset as i64,
                size,
                len: self.data.len(),
            }),
        }
    }

    /// Borrow `size` bytes at `offset` without copying.
    pub fn range(&self, offset: usize, size: usize) -> Result<&'a [u8]> {
        self.check(offset, size)?;
        Ok(&self.data[offset..offset + size])
    }

    /// Resolve a self-relative offset stored at `at`.
    ///
    /// Returns the absolute target after checking that `size` bytes starting
    /// there lie within the blob. The caller handles the null sentinel.
    pub fn resolve(&self, at: usize, relative: i32, size: usize) -> Result<usize> {
        let target = at as i64 + relative as i64;
        if target < 0 {
            return Err(BlobError::OutOfBounds {
                offset: target,
                size,
                len: self.data.len(),
            });
        }
        let target = target as usize;
        self.check(target, size)?;
        Ok(target)
    }

    fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.range(offset, N)?);
        Ok(out)
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        self.check(offset, 1)?;
        Ok(self.data[offset])
    }

    pub fn read_i8(&self, offset: usize) -> Result<i8> {
        Ok(self.read_u8(offset)? as i8)
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_i16(&self, offset: usize) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_i32(&self, offset: usize) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_u64(&self, offset: usize) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_i64(&self, offset: usize) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_f32(&self, offset: usize) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_f64(&self, offset: usize) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array(offset)?))
    }
}
