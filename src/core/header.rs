use crate::bytes::BlobRef;
use crate::error::{Corruption, Result};
use xxhash_rust::xxh3::xxh3_64;

pub const MAGIC: [u8; 8] = *b"RBLOB\x00\x01\x00";
pub const VERSION_MAJOR: u16 = 1;
pub const VERSION_MINOR: u16 = 0;
pub const HEADER_SIZE: usize = 32;

/// Byte offset of the root pointer inside the header (its anchor address).
pub const ROOT_POINTER_OFFSET: usize = 20;

/// Header flag: `checksum` holds the xxh3-64 of the body.
pub const FLAG_CHECKSUM: u32 = 1;

/// Blob header (first 32 bytes)
///
/// ```text
/// +0   magic           "RBLOB\0\x01\0"
/// +8   version_major   u16
/// +10  version_minor   u16
/// +12  flags           u32
/// +16  total_length    u32 (header included)
/// +20  root            i32, self-relative to +20, 0 = null
/// +24  checksum        u64, xxh3-64 of bytes [32, total_length)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Magic number: "RBLOB\0\x01\0"
    pub magic: [u8; 8],

    /// Format version (major)
    pub version_major: u16,

    /// Format version (minor)
    pub version_minor: u16,

    /// Feature flags
    pub flags: u32,

    /// Total blob length in bytes, header included
    pub total_length: u32,

    /// Root pointer, relative to `ROOT_POINTER_OFFSET`
    pub root: i32,

    /// Body checksum, meaningful when `FLAG_CHECKSUM` is set
    pub checksum: u64,
}

impl Header {
    /// Create a new header with default values
    pub fn new() -> Self {
        Header {
            magic: MAGIC,
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            flags: 0,
            total_length: HEADER_SIZE as u32,
            root: 0,
            checksum: 0,
        }
    }

    pub fn has_checksum(&self) -> bool {
        self.flags & FLAG_CHECKSUM != 0
    }

    /// Absolute offset of the root record, if the root pointer is set.
    pub fn root_target(&self) -> Option<i64> {
        if self.root == 0 {
            None
        } else {
            Some(ROOT_POINTER_OFFSET as i64 + self.root as i64)
        }
    }

    /// Validate the header against the buffer it was read from.
    pub fn validate(&self, actual_len: usize) -> Result<()> {
        if self.magic != MAGIC {
            return Err(Corruption::BadMagic { found: self.magic }.into());
        }

        // Exact match for now
        if self.version_major != VERSION_MAJOR || self.version_minor != VERSION_MINOR {
            return Err(Corruption::UnsupportedVersion {
                major: self.version_major,
                minor: self.version_minor,
            }
            .into());
        }

        if self.total_length as usize != actual_len {
            return Err(Corruption::LengthMismatch {
                declared: self.total_length as u64,
                actual: actual_len,
            }
            .into());
        }

        let target = self.root_target().ok_or(Corruption::NullRoot)?;
        if target < HEADER_SIZE as i64 || target >= actual_len as i64 {
            return Err(Corruption::RootOutOfBounds {
                target,
                len: actual_len,
            }
            .into());
        }

        Ok(())
    }

    /// Compare the stored body checksum with `bytes` (the whole blob).
    pub fn verify_checksum(&self, bytes: &[u8]) -> Result<()> {
        if !self.has_checksum() {
            return Ok(());
        }
        let computed = body_checksum(bytes);
        if computed != self.checksum {
            return Err(Corruption::ChecksumMismatch {
                stored: self.checksum,
                computed,
            }
            .into());
        }
        Ok(())
    }

    /// Serialize header to bytes
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..8].copy_from_slice(&self.magic);
        bytes[8..10].copy_from_slice(&self.version_major.to_le_bytes());
        bytes[10..12].copy_from_slice(&self.version_minor.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.flags.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.total_length.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.root.to_le_bytes());
        bytes[24..32].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }

    /// Deserialize header from bytes, without validating it
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Corruption::Truncated { len: bytes.len() }.into());
        }

        let blob = BlobRef::new(bytes);
        let mut magic = [0u8; 8];
        magic.copy_from_slice(blob.range(0, 8)?);

        Ok(Header {
            magic,
            version_major: blob.read_u16(8)?,
            version_minor: blob.read_u16(10)?,
            flags: blob.read_u32(12)?,
            total_length: blob.read_u32(16)?,
            root: blob.read_i32(ROOT_POINTER_OFFSET)?,
            checksum: blob.read_u64(24)?,
        })
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

/// xxh3-64 over everything after the header.
pub fn body_checksum(bytes: &[u8]) -> u64 {
    xxh3_64(bytes.get(HEADER_SIZE..).unwrap_or(&[]))
}
