use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client as RedisClient};
use tracing::{info, warn};

use crate::services::metrics::CACHE_LOOKUPS_COUNTER;

/// Fixed key for the serialized public promotion listing. The key is not
/// parameterized by time: a cached entry can lag the true visibility
/// predicate by at most the configured TTL.
pub const VISIBLE_PROMOTIONS_KEY: &str = "promotions:visible";

/// Best-effort read-through cache in front of the public promotion listing.
///
/// The connection is optional: when Redis is unconfigured or unreachable at
/// startup, every call degrades to a no-op and reads fall through to the
/// database. Runtime errors are logged and absorbed — a cache outage never
/// fails a request.
#[derive(Clone)]
pub struct PromoCache {
    conn: Option<MultiplexedConnection>,
    ttl_seconds: u64,
}

impl PromoCache {
    pub async fn connect(redis_url: Option<&str>, ttl_seconds: u64) -> Self {
        let conn = match redis_url {
            Some(url) => match RedisClient::open(url) {
                Ok(client) => match client.get_multiplexed_async_connection().await {
                    Ok(conn) => {
                        info!("Redis connected — promotion cache enabled (ttl {ttl_seconds}s)");
                        Some(conn)
                    }
                    Err(e) => {
                        warn!("Redis unreachable ({e}) — running without cache");
                        None
                    }
                },
                Err(e) => {
                    warn!("Invalid REDIS_URL ({e}) — running without cache");
                    None
                }
            },
            None => {
                info!("REDIS_URL not set — running without cache");
                None
            }
        };
        Self { conn, ttl_seconds }
    }

    pub fn is_enabled(&self) -> bool {
        self.conn.is_some()
    }

    /// Clone of the underlying connection, for callers that share the Redis
    /// backend (login rate limiting).
    pub fn connection(&self) -> Option<MultiplexedConnection> {
        self.conn.clone()
    }

    /// Cached payload for `key`, or `None` on miss, cache-less mode, or any
    /// Redis error.
    pub async fn get(&self, key: &str) -> Option<String> {
        let Some(mut conn) = self.conn.clone() else {
            CACHE_LOOKUPS_COUNTER.with_label_values(&["bypass"]).inc();
            return None;
        };
        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(payload)) => {
                CACHE_LOOKUPS_COUNTER.with_label_values(&["hit"]).inc();
                Some(payload)
            }
            Ok(None) => {
                CACHE_LOOKUPS_COUNTER.with_label_values(&["miss"]).inc();
                None
            }
            Err(e) => {
                warn!("cache read failed for {key}: {e}");
                CACHE_LOOKUPS_COUNTER.with_label_values(&["miss"]).inc();
                None
            }
        }
    }

    /// Store `payload` under `key` with the configured TTL.
    pub async fn put(&self, key: &str, payload: &str) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        if let Err(e) = conn
            .set_ex::<_, _, ()>(key, payload, self.ttl_seconds)
            .await
        {
            warn!("cache write failed for {key}: {e}");
        }
    }

    /// Delete `key`. Called synchronously before an admin write responds.
    pub async fn invalidate(&self, key: &str) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        if let Err(e) = conn.del::<_, ()>(key).await {
            warn!("cache invalidation failed for {key}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cache_less_mode_is_a_silent_no_op() {
        let cache = PromoCache::connect(None, 300).await;
        assert!(!cache.is_enabled());
        assert!(cache.connection().is_none());

        assert_eq!(cache.get(VISIBLE_PROMOTIONS_KEY).await, None);
        // Writes and invalidations must not fail either.
        cache.put(VISIBLE_PROMOTIONS_KEY, "[]").await;
        cache.invalidate(VISIBLE_PROMOTIONS_KEY).await;
    }

    #[tokio::test]
    async fn unreachable_backend_degrades_to_cache_less_mode() {
        // Nothing listens on this port; connect must absorb the failure.
        let cache = PromoCache::connect(Some("redis://127.0.0.1:1/"), 300).await;
        assert!(!cache.is_enabled());
        assert_eq!(cache.get(VISIBLE_PROMOTIONS_KEY).await, None);
    }
}
