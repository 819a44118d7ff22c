//! Redis-backed [`super::ResultCache`], behind the `redis-cache` feature.

use std::time::Duration;

use redis::Commands;

use crate::error::{RagError, Result};

use super::ResultCache;

/// Result cache backed by a Redis `SETEX`/`GET` pair.
pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    /// Connects to `url`, failing fast so the caller can fall back to an
    /// in-process cache.
    pub fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| RagError::CacheUnavailable {
            message: format!("invalid redis url: {e}"),
        })?;
        let mut conn = client
            .get_connection()
            .map_err(|e| RagError::CacheUnavailable {
                message: format!("redis connection failed: {e}"),
            })?;
        let _: String = redis::cmd("PING")
            .query(&mut conn)
            .map_err(|e| RagError::CacheUnavailable {
                message: format!("redis ping failed: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl ResultCache for RedisCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.client.get_connection().ok()?;
        conn.get(key).ok()
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) {
        if let Ok(mut conn) = self.client.get_connection() {
            let _: Result<(), redis::RedisError> =
                conn.set_ex(key, value, ttl.as_secs().max(1));
        }
    }
}
