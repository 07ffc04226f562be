//! Cache storage trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::entry::CacheEntry;

/// Trait for cache storage backends.
///
/// `get/set/delete/clear` are the only operations the cache layer needs.
pub trait CacheStorage: Send + Sync {
  /// Get the entry stored under `key`, fresh or not.
  fn get(&self, key: &str) -> Option<CacheEntry>;

  /// Store an entry, replacing any previous one.
  fn set(&self, key: &str, entry: CacheEntry);

  /// Remove the entry stored under `key`.
  fn delete(&self, key: &str);

  /// Remove every entry.
  fn clear(&self);

  /// Number of stored entries (fresh or stale).
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _key: &str) -> Option<CacheEntry> {
    None // Always miss
  }

  fn set(&self, _key: &str, _entry: CacheEntry) {}

  fn delete(&self, _key: &str) {}

  fn clear(&self) {}

  fn len(&self) -> usize {
    0
  }
}

/// Process-local cache storage backed by a `HashMap`.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
    // A panic while holding the lock can't leave a half-written entry,
    // so a poisoned map is still usable.
    self
      .entries
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &str) -> Option<CacheEntry> {
    self.entries().get(key).cloned()
  }

  fn set(&self, key: &str, entry: CacheEntry) {
    self.entries().insert(key.to_string(), entry);
  }

  fn delete(&self, key: &str) {
    self.entries().remove(key);
  }

  fn clear(&self) {
    self.entries().clear();
  }

  fn len(&self) -> usize {
    self.entries().len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_memory_storage_set_get_delete() {
    let storage = MemoryStorage::new();
    storage.set("get:/a/", CacheEntry::new(json!([1, 2])));

    assert_eq!(storage.get("get:/a/").map(|e| e.data), Some(json!([1, 2])));
    assert!(storage.get("get:/b/").is_none());

    storage.delete("get:/a/");
    assert!(storage.get("get:/a/").is_none());
    assert!(storage.is_empty());
  }

  #[test]
  fn test_memory_storage_replaces_wholesale() {
    let storage = MemoryStorage::new();
    storage.set("get:/a/", CacheEntry::new(json!({"x": 1, "y": 2})));
    storage.set("get:/a/", CacheEntry::new(json!({"x": 3})));

    assert_eq!(storage.get("get:/a/").map(|e| e.data), Some(json!({"x": 3})));
    assert_eq!(storage.len(), 1);
  }

  #[test]
  fn test_memory_storage_clear() {
    let storage = MemoryStorage::new();
    storage.set("get:/a/", CacheEntry::new(json!(1)));
    storage.set("get:/b/", CacheEntry::new(json!(2)));

    storage.clear();
    assert_eq!(storage.len(), 0);
  }

  #[test]
  fn test_noop_storage_always_misses() {
    let storage = NoopStorage;
    storage.set("get:/a/", CacheEntry::new(json!(1)));
    assert!(storage.get("get:/a/").is_none());
    assert!(storage.is_empty());
  }
}
