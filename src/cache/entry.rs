//! Cache entry and key types.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::time::Instant;

use crate::api::Method;

/// A cached response payload.
#[derive(Debug, Clone)]
pub struct CacheEntry {
  /// Decoded response body (`Value::Null` for an empty body)
  pub data: Value,
  /// Monotonic creation time, used for staleness checks
  pub stored_at: Instant,
  /// Wall-clock creation time, for display
  pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
  pub fn new(data: Value) -> Self {
    Self {
      data,
      stored_at: Instant::now(),
      cached_at: Utc::now(),
    }
  }
}

/// Build the cache key for a request: `"get:/restaurant/5/orders/"`.
pub fn cache_key(method: Method, url: &str) -> String {
  format!("{}:{}", method.as_str(), url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cache_key_format() {
    assert_eq!(
      cache_key(Method::Get, "/restaurant/5/menu-items/"),
      "get:/restaurant/5/menu-items/"
    );
  }

  #[test]
  fn test_cache_key_keeps_query_string() {
    assert_eq!(
      cache_key(Method::Get, "/restaurant/5/menu-items/?category=pizza"),
      "get:/restaurant/5/menu-items/?category=pizza"
    );
  }
}
