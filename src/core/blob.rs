//! Loaded, validated blob images
//!
//! A [`BlobImage`] owns the bytes of one resource file. It is only ever
//! constructed after the header has been validated, and every view handed
//! out borrows from it.

use crate::bytes::BlobRef;
use crate::error::{Corruption, Result};
use crate::header::{Header, ROOT_POINTER_OFFSET};
use crate::pointer::RelPtr;
use crate::view::View;
use memmap2::Mmap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Backing storage of a blob.
pub enum BlobData {
    Owned(Vec<u8>),
    Shared(Arc<[u8]>),
    Mapped(Mmap),
}

impl BlobData {
    /// Read a whole file, optionally memory-mapping it instead of copying.
    ///
    /// With `memory_map` set, the file must not be truncated or modified by
    /// any process while the returned data is alive. The mapping cannot detect
    /// such changes and reading through it afterwards is undefined behaviour.
    pub fn read_file<P: AsRef<Path>>(path: P, memory_map: bool) -> Result<Self> {
        let mut file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();

        if memory_map && len > 0 {
            // SAFETY: the mapping is read-only. Its soundness rests on the
            // caller's guarantee, documented on `memory_map`, that no process
            // truncates or rewrites the file while the map is alive.
            let mmap = unsafe { Mmap::map(&file) }?;
            return Ok(BlobData::Mapped(mmap));
        }

        let mut buffer = Vec::with_capacity(len as usize);
        file.read_to_end(&mut buffer)?;
        Ok(BlobData::Owned(buffer))
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, BlobData::Mapped(_))
    }
}

impl Deref for BlobData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            BlobData::Owned(bytes) => bytes,
            BlobData::Shared(bytes) => bytes,
            BlobData::Mapped(mmap) => mmap,
        }
    }
}

impl From<Vec<u8>> for BlobData {
    fn from(bytes: Vec<u8>) -> Self {
        BlobData::Owned(bytes)
    }
}

impl From<Arc<[u8]>> for BlobData {
    fn from(bytes: Arc<[u8]>) -> Self {
        BlobData::Shared(bytes)
    }
}

impl From<&[u8]> for BlobData {
    fn from(bytes: &[u8]) -> Self {
        BlobData::Owned(bytes.to_vec())
    }
}

impl From<Mmap> for BlobData {
    fn from(mmap: Mmap) -> Self {
        BlobData::Mapped(mmap)
    }
}

impl fmt::Debug for BlobData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            BlobData::Owned(_) => "Owned",
            BlobData::Shared(_) => "Shared",
            BlobData::Mapped(_) => "Mapped",
        };
        write!(f, "BlobData::{}({} bytes)", kind, self.len())
    }
}

/// Options applied when validating a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Check the body checksum when the header carries one.
    pub verify_checksum: bool,

    /// Memory-map files instead of reading them into memory.
    ///
    /// Only enable this for files nothing will truncate or rewrite while they
    /// are loaded, by this or any other process. A mapped file that changes
    /// underneath the image is undefined behaviour, not a reported error.
    pub memory_map: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            verify_checksum: true,
            memory_map: false,
        }
    }
}

/// A validated blob and its header.
pub struct BlobImage {
    data: BlobData,
    header: Header,
}

impl BlobImage {
    /// Validate `data` with default options.
    pub fn load(data: impl Into<BlobData>) -> Result<Self> {
        Self::load_with(data, &LoadOptions::default())
    }

    /// Validate `data`. No image is returned unless the header, length,
    /// root pointer and (optionally) checksum all check out.
    pub fn load_with(data: impl Into<BlobData>, options: &LoadOptions) -> Result<Self> {
        let data = data.into();
        let header = Header::from_bytes(&data)?;
        header.validate(data.len())?;

        if options.verify_checksum {
            header.verify_checksum(&data)?;
        }

        debug!(
            "Loaded blob v{}.{}: {} bytes, root at {}",
            header.version_major,
            header.version_minor,
            data.len(),
            header.root_target().unwrap_or_default()
        );

        Ok(BlobImage { data, header })
    }

    /// Read (or map) a file and validate it.
    pub fn open<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        debug!("Opening blob at {:?}", path.as_ref());
        let data = BlobData::read_file(path, options.memory_map)?;
        Self::load_with(data, options)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Format version as (major, minor).
    pub fn version(&self) -> (u16, u16) {
        (self.header.version_major, self.header.version_minor)
    }

    /// Total length in bytes, header included.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: a valid blob holds at least its header and root.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn is_memory_mapped(&self) -> bool {
        self.data.is_mapped()
    }

    /// Borrowed view for decoding.
    pub fn blob(&self) -> BlobRef<'_> {
        BlobRef::new(&self.data)
    }

    /// Decode the root record as `T`.
    pub fn root<'a, T: View<'a>>(&'a self) -> Result<T> {
        RelPtr::<T>::view(self.blob(), ROOT_POINTER_OFFSET)?
            .get()?
            .ok_or_else(|| Corruption::NullRoot.into())
    }
}

impl fmt::Debug for BlobImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobImage")
            .field("header", &self.header)
            .field("data", &self.data)
            .finish()
    }
}
