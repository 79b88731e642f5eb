use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

pub const LIVE_MATCHES_TTL: Duration = Duration::from_secs(30);
pub const LIVE_MATCHES_KEY: &str = "live_matches";

#[derive(Clone)]
pub struct CacheEntry<V> {
    pub key: String,
    pub data: V,
    pub stored_at: Instant,
}

/// Keyed store whose entries go stale `ttl` after they were written.
///
/// Staleness is checked on read; nothing is evicted in the background and a
/// `put` replaces the previous entry for the key.
pub struct Cache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> Cache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                debug!("Cache hit for {}", key);
                Some(entry.data.clone())
            }
            _ => {
                debug!("Cache miss for {}", key);
                None
            }
        }
    }

    pub fn put(&self, key: &str, data: V) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key.to_string(),
            CacheEntry {
                key: key.to_string(),
                data,
                stored_at: Instant::now(),
            },
        );
        debug!("Cached data for {}", key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn read_within_ttl_returns_written_value() {
        let cache = Cache::new(LIVE_MATCHES_TTL);
        cache.put(LIVE_MATCHES_KEY, vec!["a".to_string()]);

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(cache.get(LIVE_MATCHES_KEY), Some(vec!["a".to_string()]));
    }

    #[tokio::test(start_paused = true)]
    async fn read_after_ttl_is_absent() {
        let cache = Cache::new(LIVE_MATCHES_TTL);
        cache.put(LIVE_MATCHES_KEY, 7u32);

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.get(LIVE_MATCHES_KEY), None);
    }

    #[tokio::test(start_paused = true)]
    async fn put_overwrites_and_restarts_ttl() {
        let cache = Cache::new(LIVE_MATCHES_TTL);
        cache.put("k", 1u32);
        tokio::time::advance(Duration::from_secs(20)).await;
        cache.put("k", 2u32);
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.get("other"), None);
    }
}
