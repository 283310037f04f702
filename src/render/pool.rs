//! Render-target pooling.
//!
//! Constructing a render target (and registering its fonts) is the most
//! expensive per-request setup, so finished targets are reset and reused.
//! The contract is reset-or-discard: a target goes back into the pool only
//! if its `reset()` succeeds; anything that cannot prove it is pristine is
//! dropped instead, so state never leaks between requests.

use std::collections::HashSet;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::FacturaError;
use crate::render::backend::Backend;

/// Default number of idle targets kept around.
pub const DEFAULT_POOL_CAPACITY: usize = 4;

/// Per-target font-load memoization.
///
/// Fonts are immutable resources once registered with a backend instance,
/// so this cache survives `reset()` and spares repeat registrations across
/// the instance's lifetime. It is keyed by font family name and independent
/// of the pool's own bookkeeping.
#[derive(Debug, Default)]
pub struct FontCache {
    loaded: HashSet<String>,
    system_loaded: bool,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a font family is already registered on this target.
    pub fn is_loaded(&self, family: &str) -> bool {
        self.loaded.contains(family)
    }

    /// Mark a font family as registered.
    pub fn mark_loaded(&mut self, family: &str) {
        self.loaded.insert(family.to_string());
    }

    /// Whether the full configured font set has been registered.
    pub fn is_system_loaded(&self) -> bool {
        self.system_loaded
    }

    /// Mark the full configured font set as registered.
    pub fn mark_system_loaded(&mut self) {
        self.system_loaded = true;
    }
}

/// A pooled render target: the backend instance plus its font bookkeeping.
pub struct PooledTarget<B> {
    pub backend: B,
    pub fonts: FontCache,
}

/// Bounded pool of reusable render targets.
pub struct TargetPool<B> {
    idle: Mutex<Vec<PooledTarget<B>>>,
    capacity: usize,
    factory: Box<dyn Fn() -> Result<B, FacturaError> + Send + Sync>,
}

impl<B: Backend> TargetPool<B> {
    /// Create a pool that builds new targets with `factory` when empty.
    pub fn new(
        capacity: usize,
        factory: impl Fn() -> Result<B, FacturaError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            capacity,
            factory: Box::new(factory),
        }
    }

    /// Take an idle target, or construct a fresh one.
    pub fn acquire(&self) -> Result<PooledTarget<B>, FacturaError> {
        if let Some(target) = self.idle.lock().expect("pool lock poisoned").pop() {
            debug!("reusing pooled render target");
            return Ok(target);
        }
        let backend = (self.factory)()?;
        Ok(PooledTarget {
            backend,
            fonts: FontCache::new(),
        })
    }

    /// Return a target to the pool, resetting it first. A target whose
    /// reset fails — or that exceeds the pool's capacity — is dropped.
    pub fn release(&self, mut target: PooledTarget<B>) {
        match target.backend.reset() {
            Ok(()) => {
                let mut idle = self.idle.lock().expect("pool lock poisoned");
                if idle.len() < self.capacity {
                    idle.push(target);
                } else {
                    debug!("pool at capacity; dropping render target");
                }
            }
            Err(e) => {
                warn!(%e, "render target failed reset; discarding instead of pooling");
            }
        }
    }

    /// Number of idle targets currently pooled.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().expect("pool lock poisoned").len()
    }
}
