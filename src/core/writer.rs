//! Reference encoder
//!
//! [`BlobWriter`] builds blobs the decoder accepts. It is append-only: space
//! is reserved first and fields are patched in afterwards, so records can
//! point forwards and backwards freely. Every pointer is written
//! self-relative to the address it is stored at.

use crate::enums::{BlobEnum, EnumStorage};
use crate::error::{BlobError, Result};
use crate::file_id::FileId;
use crate::header::{body_checksum, Header, FLAG_CHECKSUM, HEADER_SIZE, ROOT_POINTER_OFFSET};
use crate::view::View;

fn encode_error(message: impl Into<String>) -> BlobError {
    BlobError::Encode(message.into())
}

/// Offset from `at` to `target`, as stored in a pointer field.
fn relative(at: usize, target: usize) -> Result<i32> {
    let distance = target as i64 - at as i64;
    i32::try_from(distance).map_err(|_| {
        encode_error(format!(
            "offset from {} to {} does not fit in 32 bits",
            at, target
        ))
    })
}

#[derive(Debug, Clone)]
pub struct BlobWriter {
    buf: Vec<u8>,
    root: Option<usize>,
}

impl Default for BlobWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobWriter {
    /// Start a blob; the header is written by [`BlobWriter::finish`].
    pub fn new() -> Self {
        BlobWriter {
            buf: vec![0u8; HEADER_SIZE],
            root: None,
        }
    }

    /// Current length, header included.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.len() == HEADER_SIZE
    }

    fn align(&mut self, align: usize) {
        let align = align.max(1);
        let padded = (self.buf.len() + align - 1) / align * align;
        self.buf.resize(padded, 0);
    }

    /// Append `size` zeroed bytes at the next multiple of `align` and return
    /// their offset.
    pub fn reserve(&mut self, size: usize, align: usize) -> usize {
        self.align(align);
        let offset = self.buf.len();
        self.buf.resize(offset + size, 0);
        offset
    }

    /// Append raw bytes and return their offset.
    pub fn push_bytes(&mut self, bytes: &[u8], align: usize) -> usize {
        self.align(align);
        let offset = self.buf.len();
        self.buf.extend_from_slice(bytes);
        offset
    }

    fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let end = offset
            .checked_add(bytes.len())
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| {
                encode_error(format!(
                    "write of {} bytes at {} past end of {} reserved bytes",
                    bytes.len(),
                    offset,
                    self.buf.len()
                ))
            })?;
        if offset < HEADER_SIZE {
            return Err(encode_error(format!("write at {} overlaps the header", offset)));
        }
        self.buf[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn put_u8(&mut self, offset: usize, value: u8) -> Result<()> {
        self.write_at(offset, &[value])
    }

    pub fn put_i8(&mut self, offset: usize, value: i8) -> Result<()> {
        self.write_at(offset, &value.to_le_bytes())
    }

    pub fn put_bool(&mut self, offset: usize, value: bool) -> Result<()> {
        self.put_u8(offset, value as u8)
    }

    pub fn put_u16(&mut self, offset: usize, value: u16) -> Result<()> {
        self.write_at(offset, &value.to_le_bytes())
    }

    pub fn put_i16(&mut self, offset: usize, value: i16) -> Result<()> {
        self.write_at(offset, &value.to_le_bytes())
    }

    pub fn put_u32(&mut self, offset: usize, value: u32) -> Result<()> {
        self.write_at(offset, &value.to_le_bytes())
    }

    pub fn put_i32(&mut self, offset: usize, value: i32) -> Result<()> {
        self.write_at(offset, &value.to_le_bytes())
    }

    pub fn put_u64(&mut self, offset: usize, value: u64) -> Result<()> {
        self.write_at(offset, &value.to_le_bytes())
    }

    pub fn put_i64(&mut self, offset: usize, value: i64) -> Result<()> {
        self.write_at(offset, &value.to_le_bytes())
    }

    pub fn put_f32(&mut self, offset: usize, value: f32) -> Result<()> {
        self.write_at(offset, &value.to_le_bytes())
    }

    pub fn put_f64(&mut self, offset: usize, value: f64) -> Result<()> {
        self.write_at(offset, &value.to_le_bytes())
    }

    /// Point the 4-byte field at `at` to `target`.
    pub fn put_ptr(&mut self, at: usize, target: usize) -> Result<()> {
        let offset = relative(at, target)?;
        if offset == 0 {
            return Err(encode_error(format!("pointer at {} targets itself", at)));
        }
        self.put_i32(at, offset)
    }

    pub fn put_null_ptr(&mut self, at: usize) -> Result<()> {
        self.put_i32(at, 0)
    }

    /// Write an 8-byte array header at `at` for `count` elements from `base`.
    pub fn put_array(&mut self, at: usize, base: usize, count: usize) -> Result<()> {
        let count = u32::try_from(count)
            .map_err(|_| encode_error(format!("array of {} elements is too long", count)))?;
        let offset = if count == 0 { 0 } else { relative(at, base)? };
        self.put_i32(at, offset)?;
        self.put_u32(at + 4, count)
    }

    /// Write an 8-byte dictionary header at `at` for `count` entries whose
    /// keys start at `base`. The `count` values must follow the last key
    /// directly, with no padding.
    pub fn put_dict(&mut self, at: usize, base: usize, count: usize) -> Result<()> {
        let count = u32::try_from(count)
            .map_err(|_| encode_error(format!("dictionary of {} entries is too long", count)))?;
        let offset = if count == 0 { 0 } else { relative(at, base)? };
        self.put_i32(at, offset)?;
        self.put_u32(at + 4, count)
    }

    /// Append `text` and write a 12-byte string slot at `at` referring to it.
    pub fn put_str(&mut self, at: usize, text: &str) -> Result<()> {
        let byte_len = u32::try_from(text.len())
            .map_err(|_| encode_error("string longer than 4 GiB"))?;
        let char_count = text.chars().count() as u32;

        let offset = if text.is_empty() {
            0
        } else {
            let data = self.push_bytes(text.as_bytes(), 1);
            relative(at + 8, data)?
        };

        self.put_u32(at, byte_len)?;
        self.put_u32(at + 4, char_count)?;
        self.put_i32(at + 8, offset)
    }

    /// Reserve a fresh string slot, fill it with `text` and return the slot's
    /// offset.
    pub fn push_str(&mut self, text: &str) -> Result<usize> {
        let slot = self.reserve(12, 4);
        self.put_str(slot, text)?;
        Ok(slot)
    }

    /// Write a length-prefixed inline string into a `1 + capacity` byte slot.
    pub fn put_inline_str(&mut self, at: usize, capacity: usize, text: &str) -> Result<()> {
        if text.len() > capacity || text.len() > u8::MAX as usize {
            return Err(encode_error(format!(
                "inline string of {} bytes exceeds capacity {}",
                text.len(),
                capacity
            )));
        }
        self.write_at(at, &vec![0u8; 1 + capacity])?;
        self.put_u8(at, text.len() as u8)?;
        self.write_at(at + 1, text.as_bytes())
    }

    pub fn put_file_id(&mut self, at: usize, id: FileId) -> Result<()> {
        self.write_at(at, &id.to_bytes())
    }

    /// Store an enumerator in `S`-wide storage.
    pub fn put_enum<E: BlobEnum, S: EnumStorage>(&mut self, at: usize, value: E) -> Result<()> {
        let raw = value.to_raw();
        if S::try_from(raw).is_err() {
            return Err(encode_error(format!(
                "{} value {:#x} does not fit in {} bytes",
                E::NAME,
                raw,
                <S as View<'static>>::SIZE
            )));
        }
        let bytes = raw.to_le_bytes();
        self.write_at(at, &bytes[..<S as View<'static>>::SIZE])
    }

    /// Make the record at `offset` the blob's root.
    pub fn set_root(&mut self, offset: usize) -> Result<()> {
        if offset < HEADER_SIZE || offset >= self.buf.len() {
            return Err(encode_error(format!("root offset {} outside the body", offset)));
        }
        self.root = Some(offset);
        Ok(())
    }

    /// Write the header and return the finished blob.
    pub fn finish(mut self, checksum: bool) -> Result<Vec<u8>> {
        let root = self.root.ok_or_else(|| encode_error("root record not set"))?;

        let mut header = Header::new();
        header.total_length = u32::try_from(self.buf.len())
            .map_err(|_| encode_error("blob larger than 4 GiB"))?;
        header.root = relative(ROOT_POINTER_OFFSET, root)?;
        if checksum {
            header.flags |= FLAG_CHECKSUM;
            header.checksum = body_checksum(&self.buf);
        }

        self.buf[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
        Ok(self.buf)
    }
}
