use crate::file_id::FileId;
use std::sync::Arc;
use thiserror::Error;

/// Reasons a blob is rejected as corrupt.
///
/// Load-time reasons abort construction of the [`BlobImage`](crate::blob::BlobImage).
/// Access-time reasons (string contents, inline length, bool) are reported by
/// the view that found them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Corruption {
    #[error("blob too short for header: {len} bytes")]
    Truncated { len: usize },

    #[error("invalid magic number: {found:02x?}")]
    BadMagic { found: [u8; 8] },

    #[error("unsupported format version: {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("declared length {declared} does not match buffer size {actual}")]
    LengthMismatch { declared: u64, actual: usize },

    #[error("root pointer is null")]
    NullRoot,

    #[error("root pointer target {target} outside blob of {len} bytes")]
    RootOutOfBounds { target: i64, len: usize },

    #[error("body checksum mismatch: stored {stored:#018x}, computed {computed:#018x}")]
    ChecksumMismatch { stored: u64, computed: u64 },

    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("string at offset {offset} records {recorded} chars but holds {actual}")]
    CharCountMismatch {
        offset: usize,
        recorded: usize,
        actual: usize,
    },

    #[error("inline string length {len} exceeds capacity {capacity} at offset {offset}")]
    InlineStrTooLong {
        offset: usize,
        len: usize,
        capacity: usize,
    },

    #[error("invalid bool byte {value:#04x} at offset {offset}")]
    InvalidBool { offset: usize, value: u8 },
}

#[derive(Error, Debug, Clone)]
pub enum BlobError {
    #[error("corrupt blob: {0}")]
    CorruptBlob(#[from] Corruption),

    #[error("access of {size} bytes at offset {offset} escapes blob of {len} bytes")]
    OutOfBounds { offset: i64, size: usize, len: usize },

    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("value {value:#x} is not a declared {name} enumerator")]
    UnknownEnumValue { name: &'static str, value: u64 },

    #[error("external file not found: {0}")]
    FileNotFound(FileId),

    #[error("failed to load external file {id}: {source}")]
    LoadFailure {
        id: FileId,
        #[source]
        source: Box<BlobError>,
    },

    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("encode error: {0}")]
    Encode(String),
}

impl From<std::io::Error> for BlobError {
    fn from(err: std::io::Error) -> Self {
        BlobError::Io(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BlobError>;
