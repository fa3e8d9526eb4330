//! Process-wide cache of loaded resources
//!
//! Keys are `(resource type, FileId)`. A short lock on the key map finds the
//! key's slot; the slot's own gate is then held across the physical load, so
//! concurrent callers of one key wait for a single load while other keys
//! proceed. Callers that waited behind a load receive its result, success or
//! failure. Failures are not kept: a failed slot leaves the key map at once,
//! so the next call retries and missing ids do not accumulate.

use crate::blob::{BlobImage, LoadOptions};
use crate::error::{BlobError, Result};
use crate::external::{Handle, Resource};
use crate::file_id::FileId;
use crate::store::BlobStore;
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

type Key = (TypeId, FileId);

/// Per-key state.
#[derive(Default)]
struct Slot {
    /// Set once by the load that succeeded.
    image: OnceLock<Arc<BlobImage>>,
    /// Held across a load; holds the error of the failed load for callers
    /// queued behind it.
    gate: Mutex<Option<BlobError>>,
    /// Number of finished load attempts.
    attempts: AtomicU64,
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Physical loads that produced an image
    pub loads: u64,
    /// Resolutions served from an already-loaded image
    pub hits: u64,
    /// Resolutions that found no image, whether they loaded or shared a
    /// failed load
    pub misses: u64,
    /// Physical loads that failed
    pub failures: u64,
}

impl CacheStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[derive(Default)]
struct Counters {
    loads: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

/// Shares loaded blob images between every reference to the same file.
pub struct ResourceCache {
    store: Arc<dyn BlobStore>,
    options: LoadOptions,
    slots: Mutex<HashMap<Key, Arc<Slot>>>,
    counters: Counters,
}

impl ResourceCache {
    pub fn new(store: Arc<dyn BlobStore>, options: LoadOptions) -> Self {
        ResourceCache {
            store,
            options,
            slots: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// Get the loaded resource `id`, loading it on first use.
    ///
    /// Fails with `FileNotFound` when the store has no such file and with
    /// `LoadFailure` when it exists but cannot be read or validated.
    pub fn resolve<R: Resource>(&self, id: FileId) -> Result<Handle<R>> {
        if id.is_none() {
            return Err(BlobError::FileNotFound(id));
        }

        let key = (TypeId::of::<R>(), id);

        loop {
            let slot = self.slot(key);

            if let Some(image) = slot.image.get() {
                return Ok(self.hit(id, image));
            }

            let seen = slot.attempts.load(Ordering::Acquire);
            let mut gate = slot.gate.lock();

            // Another caller finished while we waited
            if let Some(image) = slot.image.get() {
                return Ok(self.hit(id, image));
            }
            if slot.attempts.load(Ordering::Acquire) != seen {
                if let Some(err) = gate.as_ref() {
                    self.counters.misses.fetch_add(1, Ordering::Relaxed);
                    debug!("Sharing failed load of {}", id);
                    return Err(err.clone());
                }
            }

            // Retired by a failed load or by `clear` before we got the gate
            if !self.is_current(&key, &slot) {
                continue;
            }

            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            debug!("Cache miss for {}", id);

            let outcome = match self.load(id) {
                Ok(image) => {
                    let image = Arc::new(image);
                    let _ = slot.image.set(Arc::clone(&image));
                    *gate = None;
                    self.counters.loads.fetch_add(1, Ordering::Relaxed);
                    info!("Loaded resource {} ({} bytes)", id, image.len());
                    Ok(Handle::new(id, image))
                }
                Err(err) => {
                    self.counters.failures.fetch_add(1, Ordering::Relaxed);
                    warn!("Failed to resolve {}: {}", id, err);
                    *gate = Some(err.clone());
                    self.retire(&key, &slot);
                    Err(err)
                }
            };
            slot.attempts.fetch_add(1, Ordering::Release);

            return outcome;
        }
    }

    /// True if `id` is loaded for resource type `R`.
    pub fn contains<R: Resource>(&self, id: FileId) -> bool {
        self.slots
            .lock()
            .get(&(TypeId::of::<R>(), id))
            .map_or(false, |slot| slot.image.get().is_some())
    }

    /// Number of loaded images.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.image.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached image. Outstanding handles stay valid.
    pub fn clear(&self) {
        let mut slots = self.slots.lock();
        debug!("Clearing resource cache ({} slots)", slots.len());
        slots.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            loads: self.counters.loads.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    fn slot(&self, key: Key) -> Arc<Slot> {
        Arc::clone(self.slots.lock().entry(key).or_default())
    }

    fn is_current(&self, key: &Key, slot: &Arc<Slot>) -> bool {
        self.slots
            .lock()
            .get(key)
            .map_or(false, |current| Arc::ptr_eq(current, slot))
    }

    /// Drop a failed slot from the map. Callers already holding it still
    /// see its error; the next lookup starts a fresh slot.
    fn retire(&self, key: &Key, slot: &Arc<Slot>) {
        let mut slots = self.slots.lock();
        if slots.get(key).map_or(false, |current| Arc::ptr_eq(current, slot)) {
            slots.remove(key);
        }
    }

    fn hit<R: Resource>(&self, id: FileId, image: &Arc<BlobImage>) -> Handle<R> {
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        debug!("Cache hit for {}", id);
        Handle::new(id, Arc::clone(image))
    }

    fn load(&self, id: FileId) -> Result<BlobImage> {
        let data = match self.store.fetch(id) {
            Ok(Some(data)) => data,
            Ok(None) => return Err(BlobError::FileNotFound(id)),
            Err(err) => return Err(load_failure(id, err)),
        };
        BlobImage::load_with(data, &self.options).map_err(|err| load_failure(id, err))
    }
}

fn load_failure(id: FileId, source: BlobError) -> BlobError {
    BlobError::LoadFailure {
        id,
        source: Box::new(source),
    }
}

impl fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache")
            .field("options", &self.options)
            .field("stats", &self.stats())
            .finish()
    }
}
