//! Self-relative pointers
//!
//! A pointer is stored as a little-endian `i32` holding the distance from the
//! pointer's own address to its target. An offset of 0 (a pointer to itself)
//! is the null sentinel.

use crate::bytes::BlobRef;
use crate::error::Result;
use crate::view::View;
use std::fmt;
use std::marker::PhantomData;

/// Stored offset meaning "no value".
pub const NULL_OFFSET: i32 = 0;

/// Non-owning pointer to a `T` elsewhere in the same blob.
pub struct RelPtr<'a, T> {
    blob: BlobRef<'a>,
    at: usize,
    offset: i32,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: View<'a>> RelPtr<'a, T> {
    pub fn is_null(&self) -> bool {
        self.offset == NULL_OFFSET
    }

    /// The stored offset, relative to [`RelPtr::address`].
    pub fn raw_offset(&self) -> i32 {
        self.offset
    }

    /// Absolute address of the pointer itself (the anchor).
    pub fn address(&self) -> usize {
        self.at
    }

    /// Absolute address of the target, bounds-checked for `T::SIZE` bytes.
    ///
    /// Returns `Ok(None)` for null without any address arithmetic.
    pub fn target(&self) -> Result<Option<usize>> {
        if self.is_null() {
            return Ok(None);
        }
        self.blob.resolve(self.at, self.offset, T::SIZE).map(Some)
    }

    /// Resolve and decode the target.
    pub fn get(&self) -> Result<Option<T>> {
        match self.target()? {
            Some(target) => T::view(self.blob, target).map(Some),
            None => Ok(None),
        }
    }
}

impl<'a, T> Clone for RelPtr<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for RelPtr<'a, T> {}

impl<'a, T> fmt::Debug for RelPtr<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelPtr")
            .field("at", &self.at)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, T: View<'a>> View<'a> for RelPtr<'a, T> {
    const SIZE: usize = 4;

    fn view(blob: BlobRef<'a>, offset: usize) -> Result<Self> {
        Ok(RelPtr {
            blob,
            at: offset,
            offset: blob.read_i32(offset)?,
            _marker: PhantomData,
        })
    }
}
