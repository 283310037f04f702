//! Parsed-template caching.
//!
//! Templates are parsed once and shared across requests. An entry is
//! invalidated when the source file's modification time advances, when the
//! entry outlives the TTL, or when the store exceeds capacity (LRU by last
//! access). A background sweep removes expired entries even for templates
//! nobody fetches anymore, so the store stays bounded.
//!
//! Lock discipline: lookups take the shared lock; inserts, evictions, clears
//! and sweeps take the exclusive lock. The hit-path access-time touch is an
//! atomic store inside the entry, so concurrent readers never lose updates.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::FacturaError;
use crate::template::element::Element;
use crate::template::parser;

/// Default maximum number of cached templates.
pub const DEFAULT_CAPACITY: usize = 100;

/// Default entry time-to-live.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Default interval between background sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// A cached parsed template plus its invalidation metadata.
struct CacheEntry {
    elements: Arc<[Element]>,
    hash: String,
    created: Instant,
    /// Milliseconds since the cache epoch of the most recent access.
    /// Atomic so hits can touch it under the shared lock.
    accessed: AtomicU64,
    source_mtime: SystemTime,
}

/// Aggregate cache statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub ttl: Duration,
}

/// Keyed store of parsed templates with mtime/TTL invalidation and LRU
/// eviction.
///
/// Construct with [`TemplateCache::new`], which returns an `Arc` and spawns
/// the background sweeper; the sweeper holds only a `Weak` reference and
/// exits once the cache is dropped.
pub struct TemplateCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    capacity: usize,
    ttl: Duration,
    epoch: Instant,
}

impl TemplateCache {
    /// Create a cache with the given capacity and TTL, sweeping at the
    /// default interval.
    pub fn new(capacity: usize, ttl: Duration) -> Arc<Self> {
        Self::with_sweep_interval(capacity, ttl, DEFAULT_SWEEP_INTERVAL)
    }

    /// Create a cache with an explicit background sweep interval.
    pub fn with_sweep_interval(
        capacity: usize,
        ttl: Duration,
        sweep_interval: Duration,
    ) -> Arc<Self> {
        let cache = Arc::new(Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
            ttl,
            epoch: Instant::now(),
        });

        let weak: Weak<TemplateCache> = Arc::downgrade(&cache);
        let spawned = thread::Builder::new()
            .name("factura-cache-sweep".into())
            .spawn(move || {
                loop {
                    thread::sleep(sweep_interval);
                    match weak.upgrade() {
                        Some(cache) => {
                            cache.sweep();
                        }
                        None => break,
                    }
                }
            });
        if let Err(e) = spawned {
            warn!(%e, "failed to spawn cache sweep thread; TTL enforcement is fetch-time only");
        }

        cache
    }

    /// Fetch the parsed elements for a template path, parsing and caching
    /// on miss or invalidation.
    pub fn fetch(&self, path: impl AsRef<Path>) -> Result<Arc<[Element]>, FacturaError> {
        let path = path.as_ref();
        let key = path.to_string_lossy().into_owned();

        if let Some(elements) = self.lookup(&key, path) {
            debug!(path = %path.display(), "template loaded from cache");
            return Ok(elements);
        }

        // Parse outside any lock; concurrent misses may parse redundantly
        // but never block readers.
        let elements: Arc<[Element]> = parser::parse_file(path)?.into();
        debug!(path = %path.display(), count = elements.len(), "parsed template");

        // A stat failure here means the file vanished between parse and
        // insert; serve the parse result without caching it.
        let Ok(source_mtime) = std::fs::metadata(path).and_then(|m| m.modified()) else {
            warn!(path = %path.display(), "cannot stat template source; skipping cache insert");
            return Ok(elements);
        };

        let entry = CacheEntry {
            elements: elements.clone(),
            hash: hash_elements(&elements),
            created: Instant::now(),
            accessed: AtomicU64::new(self.now_ms()),
            source_mtime,
        };

        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.insert(key, entry);
        while entries.len() > self.capacity {
            evict_oldest(&mut entries);
        }

        Ok(elements)
    }

    /// Shared-lock hit check: entry present, not expired, source unchanged.
    fn lookup(&self, key: &str, path: &Path) -> Option<Arc<[Element]>> {
        let entries = self.entries.read().expect("cache lock poisoned");
        let entry = entries.get(key)?;

        if entry.created.elapsed() > self.ttl {
            return None;
        }

        // A stat failure is treated as invalidation, not an error; the
        // fall-through parse surfaces the real problem if the file is gone.
        let mtime = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
        if mtime > entry.source_mtime {
            return None;
        }

        entry.accessed.store(self.now_ms(), Ordering::Relaxed);
        Some(entry.elements.clone())
    }

    /// The content hash of the cached entry for `path`, if one is present.
    pub fn content_hash(&self, path: impl AsRef<Path>) -> Option<String> {
        let key = path.as_ref().to_string_lossy().into_owned();
        let entries = self.entries.read().expect("cache lock poisoned");
        entries.get(&key).map(|e| e.hash.clone())
    }

    /// Remove entries whose age exceeds the TTL. Returns how many were
    /// removed. Called periodically by the background sweeper.
    pub fn sweep(&self) -> usize {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| entry.created.elapsed() <= self.ttl);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "swept expired template cache entries");
        }
        removed
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.clear();
    }

    /// Point-in-time aggregate statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().expect("cache lock poisoned");
        CacheStats {
            entries: entries.len(),
            capacity: self.capacity,
            ttl: self.ttl,
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// Remove the least-recently-accessed entry.
fn evict_oldest(entries: &mut HashMap<String, CacheEntry>) {
    let oldest = entries
        .iter()
        .min_by_key(|(_, entry)| entry.accessed.load(Ordering::Relaxed))
        .map(|(key, _)| key.clone());
    if let Some(key) = oldest {
        debug!(template = %key, "evicting least recently used template");
        entries.remove(&key);
    }
}

/// Content hash over the element sequence, for change detection and
/// introspection.
fn hash_elements(elements: &[Element]) -> String {
    let mut hasher = Sha256::new();
    for element in elements {
        if let Ok(bytes) = serde_json::to_vec(element) {
            hasher.update(&bytes);
        }
    }
    hex::encode(hasher.finalize())
}
