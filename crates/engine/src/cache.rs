//! Result cache
//!
//! Memoizes expensive telemetry fetches and the heuristics computed from
//! them, keyed by computation identity plus rendered arguments, with a
//! per-call time-to-live. This replaces the per-method cache decorator of
//! the source system with one component any computation can be wrapped in.
//!
//! The cache does not serialize concurrent misses on the same key: two
//! callers racing past an expired entry may both invoke the compute
//! closure, and the later insert wins. Compute closures must therefore be
//! idempotent for a given key within the TTL window.

use dashmap::DashMap;
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Cache key: a static scope naming the computation, plus its rendered
/// arguments. A scope must always be paired with a single value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    scope: &'static str,
    args: String,
}

impl CacheKey {
    pub fn new(scope: &'static str, args: impl Into<String>) -> Self {
        Self {
            scope,
            args: args.into(),
        }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }
}

struct CacheEntry {
    stored_at: Instant,
    value: Arc<dyn Any + Send + Sync>,
}

/// TTL-bounded memoization of computation results.
#[derive(Default)]
pub struct ResultCache {
    entries: DashMap<CacheKey, CacheEntry>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key` if it is younger than `ttl`,
    /// otherwise invoke `compute`, store the result, and return it.
    pub fn get_or_compute<T, F>(&self, key: CacheKey, ttl: Duration, compute: F) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.lookup::<T>(&key, ttl) {
            return value;
        }

        let value = compute();
        self.store(key, value.clone());
        value
    }

    /// Fallible variant: errors from `compute` propagate to the caller and
    /// are never cached.
    pub fn get_or_try_compute<T, E, F>(
        &self,
        key: CacheKey,
        ttl: Duration,
        compute: F,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.lookup::<T>(&key, ttl) {
            return Ok(value);
        }

        let value = compute()?;
        self.store(key, value.clone());
        Ok(value)
    }

    /// Drop every entry regardless of TTL. Backs the explicit "refresh"
    /// action.
    pub fn invalidate_all(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        debug!(entries = dropped, "result cache invalidated");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup<T>(&self, key: &CacheKey, ttl: Duration) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() >= ttl {
            return None;
        }
        // A downcast mismatch means a scope was reused with a second value
        // type; treat it as a miss and let the recompute overwrite it.
        entry.value.downcast_ref::<T>().cloned()
    }

    fn store<T>(&self, key: CacheKey, value: T)
    where
        T: Clone + Send + Sync + 'static,
    {
        self.entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                value: Arc::new(value),
            },
        );
    }
}
