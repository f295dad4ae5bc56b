//! Request cache.
//!
//! De-duplicates reads against the content API. Entries are keyed by method,
//! URL and canonical params and expire after a TTL (30 s by default):
//!
//! ```toml
//! [cache]
//! enabled = true
//! default_ttl_seconds = 30
//! sweep_interval_seconds = 60
//! ```

mod clock;
mod config;
mod keys;
mod store;
mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
pub use keys::{RequestKey, canonical_params};
pub use store::{METRIC_CACHE_EVICT, METRIC_CACHE_HIT, METRIC_CACHE_MISS, RequestCache};
pub use sweeper::{SweepHandle, spawn_sweeper};
