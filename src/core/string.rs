//! UTF-8 string views
//!
//! Two encodings are supported:
//!
//! ```text
//! BlobStr (12 bytes)         InlineStr<N> (1 + N bytes)
//! +0  u32 byte length        +0  u8 byte length (<= N)
//! +4  u32 char count         +1  N bytes, unused tail zeroed
//! +8  i32 offset to bytes
//! ```
//!
//! Neither is NUL-terminated by contract; text is borrowed straight from the
//! blob and invalid UTF-8 is reported as corruption.

use crate::bytes::BlobRef;
use crate::error::{Corruption, Result};
use crate::view::View;

/// Decode `bytes` found at blob address `start`. Errors carry the address of
/// the first invalid byte.
fn decode_utf8(bytes: &[u8], start: usize) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|err| {
        Corruption::InvalidUtf8 {
            offset: start + err.valid_up_to(),
        }
        .into()
    })
}

/// String stored out of line: length, character count, and a self-relative
/// offset to the bytes.
#[derive(Clone, Copy, Debug)]
pub struct BlobStr<'a> {
    blob: BlobRef<'a>,
    at: usize,
    byte_len: u32,
    char_count: u32,
    offset: i32,
}

impl<'a> BlobStr<'a> {
    pub const SIZE: usize = 12;

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.byte_len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.byte_len == 0
    }

    /// Character count as recorded by the writer.
    pub fn char_count(&self) -> usize {
        self.char_count as usize
    }

    /// Absolute address of the first byte, `None` when empty.
    pub fn target(&self) -> Result<Option<usize>> {
        if self.byte_len == 0 {
            return Ok(None);
        }
        self.blob.resolve(self.at + 8, self.offset, self.len()).map(Some)
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> Result<&'a [u8]> {
        match self.target()? {
            Some(target) => self.blob.range(target, self.len()),
            None => Ok(&[]),
        }
    }

    /// Borrow the text.
    ///
    /// The bytes must be valid UTF-8 and hold exactly [`char_count`](Self::char_count)
    /// characters.
    pub fn text(&self) -> Result<&'a str> {
        let Some(target) = self.target()? else {
            return self.check_char_count("");
        };
        let text = decode_utf8(self.blob.range(target, self.len())?, target)?;
        self.check_char_count(text)
    }

    fn check_char_count(&self, text: &'a str) -> Result<&'a str> {
        let actual = text.chars().count();
        if actual != self.char_count() {
            return Err(Corruption::CharCountMismatch {
                offset: self.at,
                recorded: self.char_count(),
                actual,
            }
            .into());
        }
        Ok(text)
    }
}

impl<'a> View<'a> for BlobStr<'a> {
    const SIZE: usize = BlobStr::SIZE;

    fn view(blob: BlobRef<'a>, offset: usize) -> Result<Self> {
        Ok(BlobStr {
            blob,
            at: offset,
            byte_len: blob.read_u32(offset)?,
            char_count: blob.read_u32(offset + 4)?,
            offset: blob.read_i32(offset + 8)?,
        })
    }
}

/// Fixed-capacity string stored inline in its record.
#[derive(Clone, Copy, Debug)]
pub struct InlineStr<'a, const N: usize> {
    at: usize,
    bytes: &'a [u8],
}

impl<'a, const N: usize> InlineStr<'a, N> {
    pub const CAPACITY: usize = N;

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn text(&self) -> Result<&'a str> {
        decode_utf8(self.bytes, self.at + 1)
    }
}

impl<'a, const N: usize> View<'a> for InlineStr<'a, N> {
    const SIZE: usize = 1 + N;

    fn view(blob: BlobRef<'a>, offset: usize) -> Result<Self> {
        let len = blob.read_u8(offset)? as usize;
        if len > N {
            return Err(Corruption::InlineStrTooLong {
                offset,
                len,
                capacity: N,
            }
            .into());
        }
        // Check the full slot, not just the used prefix
        blob.check(offset, 1 + N)?;
        Ok(InlineStr {
            at: offset,
            bytes: blob.range(offset + 1, len)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BlobError;

    fn blob_str(text: &[u8], chars: u32) -> Vec<u8> {
        let mut data = vec![0u8; 12];
        data[0..4].copy_from_slice(&(text.len() as u32).to_le_bytes());
        data[4..8].copy_from_slice(&chars.to_le_bytes());
        // Bytes start right after the header: 12 - 8
        data[8..12].copy_from_slice(&4i32.to_le_bytes());
        data.extend_from_slice(text);
        data
    }

    #[test]
    fn test_blob_str_text() {
        let data = blob_str("Zürich".as_bytes(), 6);
        let s = BlobStr::view(BlobRef::new(&data), 0).unwrap();

        assert_eq!(s.text().unwrap(), "Zürich");
        assert_eq!(s.len(), 7);
        assert_eq!(s.char_count(), 6);
    }

    #[test]
    fn test_blob_str_empty_never_resolves() {
        let mut data = vec![0u8; 12];
        data[8..12].copy_from_slice(&(-1000i32).to_le_bytes());
        let s = BlobStr::view(BlobRef::new(&data), 0).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.text().unwrap(), "");
    }

    #[test]
    fn test_blob_str_invalid_utf8() {
        let data = blob_str(&[0x66, 0xFF, 0x6F], 3);
        let s = BlobStr::view(BlobRef::new(&data), 0).unwrap();
        // Bytes start at 12; the bad one is the second
        assert!(matches!(
            s.text(),
            Err(BlobError::CorruptBlob(Corruption::InvalidUtf8 { offset: 13 }))
        ));
    }

    #[test]
    fn test_blob_str_char_count_mismatch() {
        let data = blob_str("Zürich".as_bytes(), 7);
        let s = BlobStr::view(BlobRef::new(&data), 0).unwrap();
        assert_eq!(s.as_bytes().unwrap(), "Zürich".as_bytes());
        assert!(matches!(
            s.text(),
            Err(BlobError::CorruptBlob(Corruption::CharCountMismatch {
                offset: 0,
                recorded: 7,
                actual: 6,
            }))
        ));

        // An empty string must record zero characters too
        let mut empty = vec![0u8; 12];
        empty[4..8].copy_from_slice(&2u32.to_le_bytes());
        let s = BlobStr::view(BlobRef::new(&empty), 0).unwrap();
        assert!(s.text().is_err());
    }

    #[test]
    fn test_inline_str_invalid_utf8_offset() {
        let mut data = vec![0u8; 5];
        data[0] = 3;
        data[1..4].copy_from_slice(&[b'a', b'b', 0xC0]);
        let s = InlineStr::<4>::view(BlobRef::new(&data), 0).unwrap();
        assert!(matches!(
            s.text(),
            Err(BlobError::CorruptBlob(Corruption::InvalidUtf8 { offset: 3 }))
        ));
    }

    #[test]
    fn test_blob_str_truncated() {
        let mut data = blob_str(b"hello", 5);
        data.truncate(14);
        let s = BlobStr::view(BlobRef::new(&data), 0).unwrap();
        assert!(matches!(s.text(), Err(BlobError::OutOfBounds { .. })));
    }

    #[test]
    fn test_inline_str() {
        let mut data = vec![0u8; 9];
        data[0] = 3;
        data[1..4].copy_from_slice(b"cab");
        let s = InlineStr::<8>::view(BlobRef::new(&data), 0).unwrap();

        assert_eq!(s.text().unwrap(), "cab");
        assert_eq!(s.len(), 3);
        assert_eq!(<InlineStr<8> as View<'static>>::SIZE, 9);
    }

    #[test]
    fn test_inline_str_too_long() {
        let mut data = vec![0u8; 5];
        data[0] = 5;
        assert!(matches!(
            InlineStr::<4>::view(BlobRef::new(&data), 0),
            Err(BlobError::CorruptBlob(Corruption::InlineStrTooLong { len: 5, capacity: 4, .. }))
        ));
    }
}
