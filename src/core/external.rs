//! References to other blob files
//!
//! An [`ExternalRef`] is a [`FileId`] tagged with the resource type stored in
//! the target file. Resolving it goes through a [`ResourceCache`], which
//! shares one loaded image between every holder of the same reference.

use crate::blob::BlobImage;
use crate::bytes::BlobRef;
use crate::cache::ResourceCache;
use crate::error::Result;
use crate::file_id::FileId;
use crate::view::View;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A resource type: a blob file whose root record decodes as `Root`.
///
/// ```
/// use resblob::{blob_record, Resource};
///
/// blob_record! {
///     pub struct TextureHeader(16);
/// }
///
/// struct Texture;
///
/// impl Resource for Texture {
///     type Root<'a> = TextureHeader<'a>;
/// }
/// ```
pub trait Resource: 'static {
    type Root<'a>: View<'a>;
}

/// Shared ownership of a loaded resource.
///
/// Holding a handle keeps the image alive, even after the cache that
/// produced it has been cleared.
pub struct Handle<R> {
    id: FileId,
    image: Arc<BlobImage>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Resource> Handle<R> {
    pub(crate) fn new(id: FileId, image: Arc<BlobImage>) -> Self {
        Handle {
            id,
            image,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn image(&self) -> &Arc<BlobImage> {
        &self.image
    }

    /// Decode the resource's root record.
    pub fn root(&self) -> Result<R::Root<'_>> {
        self.image.root::<R::Root<'_>>()
    }

    /// True if both handles share one loaded image.
    pub fn same_image(&self, other: &Handle<R>) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}

impl<R> Clone for Handle<R> {
    fn clone(&self) -> Self {
        Handle {
            id: self.id,
            image: Arc::clone(&self.image),
            _marker: PhantomData,
        }
    }
}

impl<R> fmt::Debug for Handle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.id)
            .field("len", &self.image.len())
            .finish()
    }
}

/// Typed reference to another blob file (8 bytes: one [`FileId`]).
pub struct ExternalRef<R> {
    id: FileId,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Resource> ExternalRef<R> {
    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn is_null(&self) -> bool {
        self.id.is_none()
    }

    /// Load (or reuse) the referenced resource.
    ///
    /// Returns `Ok(None)` for a null reference without touching the cache.
    pub fn resolve(&self, cache: &ResourceCache) -> Result<Option<Handle<R>>> {
        if self.is_null() {
            return Ok(None);
        }
        cache.resolve::<R>(self.id).map(Some)
    }
}

impl<R> Clone for ExternalRef<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ExternalRef<R> {}

impl<R> fmt::Debug for ExternalRef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExternalRef({})", self.id)
    }
}

impl<'a, R: Resource> View<'a> for ExternalRef<R> {
    const SIZE: usize = FileId::SIZE;

    fn view(blob: BlobRef<'a>, offset: usize) -> Result<Self> {
        Ok(ExternalRef {
            id: FileId::view(blob, offset)?,
            _marker: PhantomData,
        })
    }
}
