use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Key/value byte-blob cache used to persist compiled dispatch tables
/// between process invocations.
///
/// Backends express failures as absence: a broken `get` returns `None`, a
/// broken `set` returns `false`. The router recovers locally from either by
/// rebuilding in-process, favoring availability over cache efficiency, so
/// backend errors never reach the dispatch caller. Timeout and retry policy
/// belong to the backend; calls are treated as opaque synchronous I/O.
pub trait Cache: Send + Sync {
    /// Fetch the blob stored under `key`, or `None` when absent (or the
    /// backend failed).
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store `value` under `key`. Returns the backend's success indicator.
    fn set(&self, key: &str, value: Vec<u8>) -> bool;

    /// `true` when an entry exists under `key`.
    fn has(&self, key: &str) -> bool;
}

/// In-process [`Cache`] backend over a `RwLock`-guarded map.
///
/// Useful as a default backend and in tests; a shared entry across processes
/// needs an external backend instead.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        // A poisoned lock reads as a miss.
        let entries = self.entries.read().ok()?;
        let value = entries.get(key).cloned();
        debug!(key = %key, hit = value.is_some(), "memory cache get");
        value
    }

    fn set(&self, key: &str, value: Vec<u8>) -> bool {
        let Ok(mut entries) = self.entries.write() else {
            return false;
        };
        debug!(key = %key, bytes = value.len(), "memory cache set");
        entries.insert(key.to_string(), value);
        true
    }

    fn has(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }
}
