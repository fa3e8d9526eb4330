//! Stable identifiers for blob files referenced from other blobs

use crate::bytes::BlobRef;
use crate::error::Result;
use crate::view::View;
use std::fmt;

/// Identifier of a blob file: the index of the archive that holds it and
/// the index of the file within that archive.
///
/// Encoded as two little-endian `u32`s (archive first). Both halves set to
/// `u32::MAX` encode "no file".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId {
    archive: u32,
    file: u32,
}

impl FileId {
    pub const SIZE: usize = 8;
    pub const NONE: FileId = FileId {
        archive: u32::MAX,
        file: u32::MAX,
    };

    pub const fn new(archive: u32, file: u32) -> Self {
        FileId { archive, file }
    }

    pub const fn archive(&self) -> u32 {
        self.archive
    }

    pub const fn file(&self) -> u32 {
        self.file
    }

    pub const fn is_none(&self) -> bool {
        self.archive == u32::MAX && self.file == u32::MAX
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[0..4].copy_from_slice(&self.archive.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.file.to_le_bytes());
        bytes
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "<none>")
        } else {
            write!(f, "{}:{}", self.archive, self.file)
        }
    }
}

impl<'a> View<'a> for FileId {
    const SIZE: usize = FileId::SIZE;

    fn view(blob: BlobRef<'a>, offset: usize) -> Result<Self> {
        Ok(FileId {
            archive: blob.read_u32(offset)?,
            file: blob.read_u32(offset + 4)?,
        })
    }
}
