//! Cache layer that applies the staleness policy on top of a storage backend.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::entry::CacheEntry;
use super::storage::{CacheStorage, MemoryStorage};

/// Default stale time: 5 minutes
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Cache layer shared by every hook created from one client.
///
/// Cloning is cheap; clones share the same storage.
#[derive(Clone)]
pub struct CacheLayer {
  storage: Arc<dyn CacheStorage>,
  /// How long before cached data is considered stale
  stale_time: Duration,
}

/// Snapshot of the cache for status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatus {
  pub entries: usize,
  pub stale_time: Duration,
}

impl CacheLayer {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: impl CacheStorage + 'static) -> Self {
    Self {
      storage: Arc::new(storage),
      stale_time: DEFAULT_STALE_TIME,
    }
  }

  /// Set the stale time for cached data.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  /// Check if an entry is stale. An entry exactly `stale_time` old is stale.
  fn is_stale(&self, entry: &CacheEntry) -> bool {
    entry.stored_at.elapsed() >= self.stale_time
  }

  /// Return the cached payload for `key` if it exists and is still fresh.
  ///
  /// Stale entries are left in place; the next `store` overwrites them.
  pub fn lookup(&self, key: &str) -> Option<Value> {
    let entry = self.storage.get(key)?;
    if self.is_stale(&entry) {
      debug!(key, cached_at = %entry.cached_at, "cache entry stale");
      return None;
    }
    Some(entry.data)
  }

  /// Store a fresh payload under `key`.
  pub fn store(&self, key: &str, data: Value) {
    self.storage.set(key, CacheEntry::new(data));
  }

  /// Drop a single entry.
  pub fn invalidate(&self, key: &str) {
    debug!(key, "cache invalidated");
    self.storage.delete(key);
  }

  /// Drop every entry.
  pub fn clear(&self) {
    debug!("cache cleared");
    self.storage.clear();
  }

  pub fn status(&self) -> CacheStatus {
    CacheStatus {
      entries: self.storage.len(),
      stale_time: self.stale_time,
    }
  }
}

impl Default for CacheLayer {
  fn default() -> Self {
    Self::new(MemoryStorage::new())
  }
}
