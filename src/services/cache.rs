use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tracing::warn;

use crate::models::feed::FeedEntry;

const FEED_KEY: &str = "ticker:active";

/// Short-lived copy of the aggregated feed.
///
/// Implementations never fail: an unreachable or corrupt cache is a miss, so
/// it can make the feed stale for at most one TTL, never unavailable.
#[async_trait]
pub trait FeedCache: Send + Sync + 'static {
    async fn get(&self) -> Option<Vec<FeedEntry>>;

    async fn put(&self, entries: &[FeedEntry]);

    async fn clear(&self);
}

/// Redis-backed cache under a single key with `SET .. EX`.
#[derive(Clone)]
pub struct RedisFeedCache {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisFeedCache {
    pub fn new(conn: MultiplexedConnection, ttl_secs: u64) -> Self {
        Self { conn, ttl_secs }
    }
}

/// Turn a raw `GET` reply into feed entries. Errors and unreadable payloads are misses.
fn decode(raw: redis::RedisResult<Option<String>>) -> Option<Vec<FeedEntry>> {
    match raw {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!("Ticker cache: discarding unreadable entry: {}", e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("Ticker cache: GET failed: {}", e);
            None
        }
    }
}

#[async_trait]
impl FeedCache for RedisFeedCache {
    async fn get(&self) -> Option<Vec<FeedEntry>> {
        let mut conn = self.conn.clone();
        decode(redis::cmd("GET").arg(FEED_KEY).query_async(&mut conn).await)
    }

    async fn put(&self, entries: &[FeedEntry]) {
        let json = match serde_json::to_string(entries) {
            Ok(json) => json,
            Err(e) => {
                warn!("Ticker cache: serialization failed: {}", e);
                return;
            }
        };

        let mut conn = self.conn.clone();
        let res: redis::RedisResult<()> = redis::cmd("SET")
            .arg(FEED_KEY)
            .arg(json)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await;
        if let Err(e) = res {
            warn!("Ticker cache: SET failed: {}", e);
        }
    }

    async fn clear(&self) {
        let mut conn = self.conn.clone();
        let res: redis::RedisResult<()> = redis::cmd("DEL").arg(FEED_KEY).query_async(&mut conn).await;
        if let Err(e) = res {
            warn!("Ticker cache: DEL failed: {}", e);
        }
    }
}

#[cfg(test)]
pub mod memory {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// In-process cache for service and router tests. With `unavailable` set
    /// it behaves like a Redis that rejects every command.
    #[derive(Default)]
    pub struct MemoryFeedCache {
        entry: Mutex<Option<Vec<FeedEntry>>>,
        clears: AtomicUsize,
        unavailable: AtomicBool,
    }

    impl MemoryFeedCache {
        pub fn unavailable() -> Self {
            let cache = Self::default();
            cache.unavailable.store(true, Ordering::SeqCst);
            cache
        }

        pub fn stored(&self) -> Option<Vec<FeedEntry>> {
            self.entry.lock().unwrap().clone()
        }

        pub fn clears(&self) -> usize {
            self.clears.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FeedCache for MemoryFeedCache {
        async fn get(&self) -> Option<Vec<FeedEntry>> {
            if self.unavailable.load(Ordering::SeqCst) {
                return None;
            }
            self.stored()
        }

        async fn put(&self, entries: &[FeedEntry]) {
            if !self.unavailable.load(Ordering::SeqCst) {
                *self.entry.lock().unwrap() = Some(entries.to_vec());
            }
        }

        async fn clear(&self) {
            self.clears.fetch_add(1, Ordering::SeqCst);
            *self.entry.lock().unwrap() = None;
        }
    }
}
