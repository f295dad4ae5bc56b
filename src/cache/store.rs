//! TTL request cache.
//!
//! Entries are fresh while `now - stored_at < ttl`. Stale entries are removed
//! lazily when read and in bulk by [`RequestCache::sweep_expired`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use metrics::counter;
use serde_json::Value;
use tracing::debug;

use crate::util::lock::mutex_lock;

use super::clock::{Clock, SystemClock};
use super::config::DEFAULT_TTL;
use super::keys::RequestKey;

const SOURCE: &str = "cache::store";

pub const METRIC_CACHE_HIT: &str = "newsdesk_request_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "newsdesk_request_cache_miss_total";
pub const METRIC_CACHE_EVICT: &str = "newsdesk_request_cache_evict_total";

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

/// In-memory response cache keyed by method, URL and params.
///
/// All operations take one mutex; the cache can be shared across tasks
/// behind an `Arc`.
pub struct RequestCache<V = Value> {
    entries: Mutex<HashMap<RequestKey, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl<V: Clone> RequestCache<V> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), DEFAULT_TTL)
    }

    pub fn with_clock(clock: Arc<dyn Clock>, default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Fresh value for the request, if any. A stale entry is removed.
    pub fn get(&self, method: &str, url: &str, params: Option<&Value>) -> Option<V> {
        let key = RequestKey::new(method, url, params);
        let now = self.clock.now();
        let mut entries = mutex_lock(&self.entries, SOURCE, "get");

        match entries.get(&key) {
            Some(entry) if entry.is_fresh(now) => {
                counter!(METRIC_CACHE_HIT).increment(1);
                debug!(key = %key, "Request cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(&key);
                counter!(METRIC_CACHE_EVICT, "reason" => "expired").increment(1);
                counter!(METRIC_CACHE_MISS).increment(1);
                debug!(key = %key, "Request cache entry expired");
                None
            }
            None => {
                counter!(METRIC_CACHE_MISS).increment(1);
                debug!(key = %key, "Request cache miss");
                None
            }
        }
    }

    /// Store with the default TTL, replacing any existing entry.
    pub fn set(&self, method: &str, url: &str, params: Option<&Value>, value: V) {
        self.set_with_ttl(method, url, params, value, self.default_ttl);
    }

    pub fn set_with_ttl(
        &self,
        method: &str,
        url: &str,
        params: Option<&Value>,
        value: V,
        ttl: Duration,
    ) {
        let key = RequestKey::new(method, url, params);
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
            ttl,
        };
        mutex_lock(&self.entries, SOURCE, "set").insert(key, entry);
    }

    pub fn invalidate(&self, method: &str, url: &str, params: Option<&Value>) {
        let key = RequestKey::new(method, url, params);
        if mutex_lock(&self.entries, SOURCE, "invalidate")
            .remove(&key)
            .is_some()
        {
            counter!(METRIC_CACHE_EVICT, "reason" => "invalidated").increment(1);
        }
    }

    /// Remove every entry whose URL starts with `url_prefix`. Returns how many were removed.
    pub fn invalidate_prefix(&self, url_prefix: &str) -> usize {
        let mut entries = mutex_lock(&self.entries, SOURCE, "invalidate_prefix");
        let before = entries.len();
        entries.retain(|key, _| !key.url().starts_with(url_prefix));
        let removed = before - entries.len();
        if removed > 0 {
            counter!(METRIC_CACHE_EVICT, "reason" => "invalidated").increment(removed as u64);
            debug!(prefix = url_prefix, removed, "Request cache prefix invalidated");
        }
        removed
    }

    pub fn invalidate_all(&self) {
        let mut entries = mutex_lock(&self.entries, SOURCE, "invalidate_all");
        let removed = entries.len();
        entries.clear();
        if removed > 0 {
            counter!(METRIC_CACHE_EVICT, "reason" => "cleared").increment(removed as u64);
        }
    }

    /// Evict every expired entry. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = mutex_lock(&self.entries, SOURCE, "sweep_expired");
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        let removed = before - entries.len();
        if removed > 0 {
            counter!(METRIC_CACHE_EVICT, "reason" => "expired").increment(removed as u64);
        }
        removed
    }

    /// Number of stored entries, including stale ones not yet evicted.
    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for RequestCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for RequestCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCache")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}
