//! Result cache (`spec.md` §4.G): 5-minute TTL, Redis-backed when
//! `RAG_REDIS_URL` is set with in-process fallback on connection failure.

#[cfg(feature = "redis-cache")]
pub mod redis_cache;

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A cache for answer-orchestrator results, keyed on the string built by
/// `spec.md` §4.G (`"<query>|<filter_source>|<filter_type>|web=<bool>"`).
pub trait ResultCache: Send + Sync {
    /// Returns the cached value for `key`, if present and unexpired.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key` with `ttl`.
    fn set(&self, key: &str, value: &str, ttl: Duration);
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process, mutex-guarded cache with TTL eviction on read.
#[derive(Default)]
pub struct InProcessCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InProcessCache {
    /// Builds an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultCache for InProcessCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    expires_at: Instant::now() + ttl,
                },
            );
        }
    }
}

/// Builds the cache key for a document/web query per `spec.md` §4.G.
#[must_use]
pub fn cache_key(query: &str, filter_source: Option<&str>, filter_type: Option<&str>, web: bool) -> String {
    format!(
        "{}|{}|{}|web={}",
        query,
        filter_source.unwrap_or(""),
        filter_type.unwrap_or(""),
        web
    )
}

/// Builds the cache key for a `research` verb invocation.
#[must_use]
pub fn research_cache_key(query: &str, filter_source: Option<&str>, filter_type: Option<&str>) -> String {
    format!(
        "research|{}|{}|{}",
        query,
        filter_source.unwrap_or(""),
        filter_type.unwrap_or("")
    )
}

/// Constructs the configured result cache: Redis-backed (behind the
/// `redis-cache` feature) when `redis_url` is set and reachable, otherwise
/// an in-process cache.
#[must_use]
pub fn build_cache(redis_url: Option<&str>) -> Box<dyn ResultCache> {
    #[cfg(feature = "redis-cache")]
    if let Some(url) = redis_url {
        if let Ok(cache) = redis_cache::RedisCache::connect(url) {
            return Box::new(cache);
        }
    }
    #[cfg(not(feature = "redis-cache"))]
    let _ = redis_url;
    Box::new(InProcessCache::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_on_empty_cache_is_none() {
        let cache = InProcessCache::new();
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn set_then_get_returns_value() {
        let cache = InProcessCache::new();
        cache.set("k", "v", Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some("v".to_string()));
    }

    #[test]
    fn expired_entry_is_evicted() {
        let cache = InProcessCache::new();
        cache.set("k", "v", Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn cache_key_matches_documented_format() {
        assert_eq!(
            cache_key("q", Some("/a.txt"), None, true),
            "q|/a.txt||web=true"
        );
    }

    #[test]
    fn research_cache_key_is_prefixed() {
        assert_eq!(research_cache_key("q", None, None), "research|q||");
    }
}
