//! Relative arrays: a count plus a self-relative offset to element 0
//!
//! Layout (8 bytes): `i32` offset relative to the array header's address,
//! then `u32` element count. Elements are contiguous with stride `T::SIZE`.
//! An empty array never resolves its offset.

use crate::bytes::BlobRef;
use crate::error::{BlobError, Result};
use crate::view::View;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

/// Non-owning view of `len` contiguous `T`s elsewhere in the same blob.
pub struct RelArray<'a, T> {
    blob: BlobRef<'a>,
    base: usize,
    len: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: View<'a>> RelArray<'a, T> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Absolute address of element 0 (meaningless when empty).
    pub fn base(&self) -> usize {
        self.base
    }

    /// Decode element `index`.
    pub fn get(&self, index: usize) -> Result<T> {
        if index >= self.len {
            return Err(BlobError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        T::view(self.blob, self.base + index * T::SIZE)
    }

    /// Iterate elements in storage order. Each call starts a fresh pass.
    pub fn iter(&self) -> RelArrayIter<'a, T> {
        RelArrayIter {
            array: *self,
            front: 0,
            back: self.len,
        }
    }

    /// Decode every element into a `Vec`, stopping at the first error.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.iter().collect()
    }
}

impl<'a, T> Clone for RelArray<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for RelArray<'a, T> {}

impl<'a, T> fmt::Debug for RelArray<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelArray")
            .field("base", &self.base)
            .field("len", &self.len)
            .finish()
    }
}

impl<'a, T: View<'a>> View<'a> for RelArray<'a, T> {
    const SIZE: usize = 8;

    fn view(blob: BlobRef<'a>, offset: usize) -> Result<Self> {
        let relative = blob.read_i32(offset)?;
        let len = blob.read_u32(offset + 4)? as usize;

        let base = if len == 0 {
            0
        } else {
            let extent = len.checked_mul(T::SIZE).ok_or(BlobError::OutOfBounds {
                offset: offset as i64 + relative as i64,
                size: usize::MAX,
                len: blob.len(),
            })?;
            blob.resolve(offset, relative, extent)?
        };

        Ok(RelArray {
            blob,
            base,
            len,
            _marker: PhantomData,
        })
    }
}

impl<'a, T: View<'a>> IntoIterator for RelArray<'a, T> {
    type Item = Result<T>;
    type IntoIter = RelArrayIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`RelArray`]. Pure over the backing bytes: cloning it or
/// calling [`RelArray::iter`] again yields the same sequence.
pub struct RelArrayIter<'a, T> {
    array: RelArray<'a, T>,
    front: usize,
    back: usize,
}

impl<'a, T> Clone for RelArrayIter<'a, T> {
    fn clone(&self) -> Self {
        RelArrayIter {
            array: self.array,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, T: View<'a>> Iterator for RelArrayIter<'a, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.array.get(self.front);
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, T: View<'a>> DoubleEndedIterator for RelArrayIter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.array.get(self.back))
    }
}

impl<'a, T: View<'a>> ExactSizeIterator for RelArrayIter<'a, T> {}

impl<'a, T: View<'a>> FusedIterator for RelArrayIter<'a, T> {}
