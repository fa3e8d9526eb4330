//! # resblob - Zero-Copy Binary Resource Blobs
//!
//! `resblob` reads compiled resource files without parsing them. A blob is a
//! validated byte buffer whose records are read in place through typed views:
//!
//! - **Relative pointers, arrays and dictionaries** resolved against the
//!   blob on access
//! - **Compact enums** stored in narrow integers with sparse values
//! - **Strings** borrowed straight from the blob bytes
//! - **External references** to other blob files, loaded once and shared
//!   through a cache
//!
//! ## Quick Start
//!
//! ```rust
//! use resblob::{blob_record, BlobImage, BlobStr, BlobWriter, Result};
//!
//! blob_record! {
//!     pub struct Greeting(16);
//! }
//!
//! impl<'a> Greeting<'a> {
//!     pub fn count(&self) -> Result<u32> {
//!         self.record().field(0)
//!     }
//!
//!     pub fn text(&self) -> Result<BlobStr<'a>> {
//!         self.record().field(4)
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let mut writer = BlobWriter::new();
//! let root = writer.reserve(16, 4);
//! writer.put_u32(root, 3)?;
//! writer.put_str(root + 4, "hello")?;
//! writer.set_root(root)?;
//!
//! let image = BlobImage::load(writer.finish(true)?)?;
//! let greeting: Greeting = image.root()?;
//! assert_eq!(greeting.count()?, 3);
//! assert_eq!(greeting.text()?.text()?, "hello");
//! # Ok(())
//! # }
//! ```
//!
//! ## Resolving External Files
//!
//! ```rust,no_run
//! use resblob::{FileId, Resource, ResourcesBuilder};
//!
//! struct Palette;
//!
//! impl Resource for Palette {
//!     type Root<'a> = u32;
//! }
//!
//! # fn main() -> resblob::Result<()> {
//! let resources = ResourcesBuilder::new()
//!     .root_dir("assets/blobs")
//!     .memory_map(true)
//!     .build()?;
//!
//! let palette = resources.load::<Palette>(FileId::new(0, 12))?;
//! println!("{} colors", palette.root()?);
//! # Ok(())
//! # }
//! ```

pub mod core;

// Re-export core modules internally so crate:: paths in core still work
#[allow(unused_imports)]
pub(crate) use crate::core::{
    array, blob, bytes, cache, config, dict, enums, error, external, file_id, header, pointer,
    store, string, view, writer,
};

pub use crate::core::{
    array::{RelArray, RelArrayIter},
    blob::{BlobData, BlobImage, LoadOptions},
    bytes::BlobRef,
    cache::{CacheStats, ResourceCache},
    config::RuntimeConfig,
    dict::{RelDict, RelDictIter},
    enums::{BlobEnum, CompactEnum, EnumStorage, TrustedEnum},
    error::{BlobError, Corruption, Result},
    external::{ExternalRef, Handle, Resource},
    file_id::FileId,
    header::{Header, FLAG_CHECKSUM, HEADER_SIZE, MAGIC, VERSION_MAJOR, VERSION_MINOR},
    pointer::RelPtr,
    store::{BlobStore, DirectoryStore, MemoryStore},
    string::{BlobStr, InlineStr},
    view::{Embedded, Flags32, RecordRef, View},
    writer::BlobWriter,
};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Entry point for applications: a resource cache over a blob store.
///
/// # Examples
///
/// ```rust,no_run
/// use resblob::Resources;
///
/// let resources = Resources::open("assets/blobs")?;
/// println!("{} resources loaded", resources.cache().len());
/// # Ok::<(), resblob::BlobError>(())
/// ```
pub struct Resources {
    cache: ResourceCache,
}

impl Resources {
    /// Serve blobs from a directory with default settings.
    pub fn open<P: AsRef<Path>>(root_dir: P) -> Result<Self> {
        ResourcesBuilder::new().root_dir(root_dir.as_ref()).build()
    }

    /// Build from a parsed [`RuntimeConfig`].
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        ResourcesBuilder::new().config(config.clone()).build()
    }

    /// Use a custom store.
    pub fn with_store(store: Arc<dyn BlobStore>, options: LoadOptions) -> Self {
        Resources {
            cache: ResourceCache::new(store, options),
        }
    }

    /// Load (or reuse) resource `id`.
    pub fn load<R: Resource>(&self, id: FileId) -> Result<Handle<R>> {
        self.cache.resolve::<R>(id)
    }

    /// Follow an external reference read from some blob.
    pub fn resolve<R: Resource>(&self, reference: &ExternalRef<R>) -> Result<Option<Handle<R>>> {
        reference.resolve(&self.cache)
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Builder for [`Resources`]
///
/// # Examples
///
/// ```rust,no_run
/// use resblob::ResourcesBuilder;
///
/// # fn main() -> resblob::Result<()> {
/// let resources = ResourcesBuilder::new()
///     .root_dir("/srv/blobs")
///     .extension("bin")
///     .verify_checksums(false)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ResourcesBuilder {
    config: RuntimeConfig,
    root_dir_set: bool,
    store: Option<Arc<dyn BlobStore>>,
}

impl ResourcesBuilder {
    pub fn new() -> Self {
        ResourcesBuilder {
            config: RuntimeConfig::default(),
            root_dir_set: false,
            store: None,
        }
    }

    /// Start from a full configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self.root_dir_set = true;
        self
    }

    /// Directory holding the blob files
    pub fn root_dir<P: Into<PathBuf>>(mut self, root_dir: P) -> Self {
        self.config.root_dir = root_dir.into();
        self.root_dir_set = true;
        self
    }

    /// Blob file extension, without the dot (default `rblob`)
    pub fn extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.config.extension = extension.into();
        self
    }

    /// Map files instead of reading them. Only for files that no process
    /// modifies while they are loaded.
    pub fn memory_map(mut self, enabled: bool) -> Self {
        self.config.memory_map = enabled;
        self
    }

    pub fn verify_checksums(mut self, enabled: bool) -> Self {
        self.config.verify_checksums = enabled;
        self
    }

    /// Read blobs from `store` instead of a directory.
    pub fn store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<Resources> {
        self.config.validate()?;
        let options = self.config.load_options();

        let store = match self.store {
            Some(store) => {
                debug!("Using custom blob store");
                store
            }
            None => {
                if !self.root_dir_set {
                    return Err(BlobError::Config(
                        "root_dir must be set when no store is given".to_string(),
                    ));
                }
                info!(
                    "Serving blobs from {:?} (*.{}, mmap: {})",
                    self.config.root_dir, self.config.extension, self.config.memory_map
                );
                Arc::new(self.config.directory_store())
            }
        };

        Ok(Resources::with_store(store, options))
    }
}

impl Default for ResourcesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
