//! Where blob bytes come from
//!
//! The cache asks a [`BlobStore`] for the bytes of a [`FileId`] and does the
//! validation itself, so a store only has to find and read files.

use crate::blob::BlobData;
use crate::error::{BlobError, Result};
use crate::file_id::FileId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_EXTENSION: &str = "rblob";

/// Source of raw blob bytes.
pub trait BlobStore: Send + Sync {
    /// Fetch the bytes of `id`. `Ok(None)` means the file does not exist.
    fn fetch(&self, id: FileId) -> Result<Option<BlobData>>;
}

/// Files laid out as `root/{archive:04}/{file:08}.{extension}`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    extension: String,
    memory_map: bool,
}

impl DirectoryStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        DirectoryStore {
            root: root.as_ref().to_path_buf(),
            extension: DEFAULT_EXTENSION.to_string(),
            memory_map: false,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Memory-map fetched files instead of copying them.
    ///
    /// The files under `root` must then stay unchanged while any image loaded
    /// from them is alive. See
    /// [`LoadOptions::memory_map`](crate::blob::LoadOptions::memory_map).
    pub fn with_memory_map(mut self, memory_map: bool) -> Self {
        self.memory_map = memory_map;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a given file is expected at.
    pub fn path_for(&self, id: FileId) -> PathBuf {
        self.root
            .join(format!("{:04}", id.archive()))
            .join(format!("{:08}.{}", id.file(), self.extension))
    }
}

impl BlobStore for DirectoryStore {
    fn fetch(&self, id: FileId) -> Result<Option<BlobData>> {
        if id.is_none() {
            return Ok(None);
        }

        let path = self.path_for(id);
        debug!("Fetching {} from {:?}", id, path);

        match BlobData::read_file(&path, self.memory_map) {
            Ok(data) => Ok(Some(data)),
            Err(BlobError::Io(err)) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// In-memory store, shared between the cache and whoever fills it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<HashMap<FileId, Arc<[u8]>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, id: FileId, bytes: impl Into<Arc<[u8]>>) {
        self.files.write().insert(id, bytes.into());
    }

    pub fn remove(&self, id: FileId) -> bool {
        self.files.write().remove(&id).is_some()
    }

    pub fn contains(&self, id: FileId) -> bool {
        self.files.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl BlobStore for MemoryStore {
    fn fetch(&self, id: FileId) -> Result<Option<BlobData>> {
        Ok(self
            .files
            .read()
            .get(&id)
            .map(|bytes| BlobData::Shared(Arc::clone(bytes))))
    }
}
