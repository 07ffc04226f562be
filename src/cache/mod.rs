//! Shared response cache for read requests.
//!
//! Every `ApiHook` created from one `ApiClient` reads and invalidates the
//! same cache. The cache:
//! - Keys entries by `"<method>:<url>"` (only `get:` keys are ever stored)
//! - Treats entries older than the stale time as misses (checked lazily)
//! - Replaces entries wholesale, never in place
//! - Sits behind a `CacheStorage` trait so tests can use isolated stores

mod entry;
mod layer;
mod storage;

pub use entry::{cache_key, CacheEntry};
pub use layer::{CacheLayer, CacheStatus, DEFAULT_STALE_TIME};
pub use storage::{CacheStorage, MemoryStorage, NoopStorage};
