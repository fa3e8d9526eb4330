//! Relative dictionaries: parallel key and value runs behind one header
//!
//! Layout (8 bytes): `i32` offset relative to the header's address, then
//! `u32` entry count. At the target sit `count` keys with stride `K::SIZE`,
//! followed immediately by `count` values with stride `V::SIZE`. Entries are
//! kept in the order the writer emitted them; lookup is a linear scan and the
//! first matching key wins.

use crate::bytes::BlobRef;
use crate::error::{BlobError, Result};
use crate::view::View;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

/// Non-owning view of `len` key/value pairs elsewhere in the same blob.
pub struct RelDict<'a, K, V> {
    blob: BlobRef<'a>,
    keys: usize,
    len: usize,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<'a, K: View<'a>, V: View<'a>> RelDict<'a, K, V> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len {
            return Err(BlobError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        Ok(())
    }

    /// Address of value 0.
    fn values(&self) -> usize {
        self.keys + self.len * K::SIZE
    }

    /// Decode key `index`.
    pub fn key(&self, index: usize) -> Result<K> {
        self.check_index(index)?;
        K::view(self.blob, self.keys + index * K::SIZE)
    }

    /// Decode value `index`.
    pub fn value(&self, index: usize) -> Result<V> {
        self.check_index(index)?;
        V::view(self.blob, self.values() + index * V::SIZE)
    }

    /// Decode entry `index`.
    pub fn entry(&self, index: usize) -> Result<(K, V)> {
        Ok((self.key(index)?, self.value(index)?))
    }

    /// Iterate entries in storage order. Each call starts a fresh pass.
    pub fn iter(&self) -> RelDictIter<'a, K, V> {
        RelDictIter {
            dict: *self,
            front: 0,
            back: self.len,
        }
    }

    /// Decode every value, stopping at the first error.
    pub fn values_vec(&self) -> Result<Vec<V>> {
        (0..self.len).map(|i| self.value(i)).collect()
    }
}

impl<'a, K: View<'a> + PartialEq, V: View<'a>> RelDict<'a, K, V> {
    /// Index of the first entry whose key equals `key`.
    pub fn position(&self, key: &K) -> Result<Option<usize>> {
        for index in 0..self.len {
            if self.key(index)? == *key {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Value stored under `key`, `None` when no entry has that key.
    pub fn get(&self, key: &K) -> Result<Option<V>> {
        match self.position(key)? {
            Some(index) => self.value(index).map(Some),
            None => Ok(None),
        }
    }

    pub fn contains_key(&self, key: &K) -> Result<bool> {
        Ok(self.position(key)?.is_some())
    }
}

impl<'a, K, V> Clone for RelDict<'a, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V> Copy for RelDict<'a, K, V> {}

impl<'a, K, V> fmt::Debug for RelDict<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelDict")
            .field("keys", &self.keys)
            .field("len", &self.len)
            .finish()
    }
}

impl<'a, K: View<'a>, V: View<'a>> View<'a> for RelDict<'a, K, V> {
    const SIZE: usize = 8;

    fn view(blob: BlobRef<'a>, offset: usize) -> Result<Self> {
        let relative = blob.read_i32(offset)?;
        let len = blob.read_u32(offset + 4)? as usize;

        let keys = if len == 0 {
            0
        } else {
            let extent = (K::SIZE + V::SIZE)
                .checked_mul(len)
                .ok_or(BlobError::OutOfBounds {
                    offset: offset as i64 + relative as i64,
                    size: usize::MAX,
                    len: blob.len(),
                })?;
            blob.resolve(offset, relative, extent)?
        };

        Ok(RelDict {
            blob,
            keys,
            len,
            _marker: PhantomData,
        })
    }
}

impl<'a, K: View<'a>, V: View<'a>> IntoIterator for RelDict<'a, K, V> {
    type Item = Result<(K, V)>;
    type IntoIter = RelDictIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of a [`RelDict`].
pub struct RelDictIter<'a, K, V> {
    dict: RelDict<'a, K, V>,
    front: usize,
    back: usize,
}

impl<'a, K, V> Clone for RelDictIter<'a, K, V> {
    fn clone(&self) -> Self {
        RelDictIter {
            dict: self.dict,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, K: View<'a>, V: View<'a>> Iterator for RelDictIter<'a, K, V> {
    type Item = Result<(K, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.dict.entry(self.front);
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, K: View<'a>, V: View<'a>> DoubleEndedIterator for RelDictIter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.dict.entry(self.back))
    }
}

impl<'a, K: View<'a>, V: View<'a>> ExactSizeIterator for RelDictIter<'a, K, V> {}

impl<'a, K: View<'a>, V: View<'a>> FusedIterator for RelDictIter<'a, K, V> {}
