use std::time::Duration;

use anyhow::Context;
use bb8_redis::{bb8::Pool, redis, RedisConnectionManager};
use folio_cache_contracts::{CacheService, Counter};

#[derive(Debug, Clone)]
pub struct ValkeyCache {
    pool: Pool<RedisConnectionManager>,
}

#[derive(Debug)]
pub struct ValkeyCacheConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl ValkeyCache {
    pub async fn connect(config: &ValkeyCacheConfig) -> anyhow::Result<Self> {
        let manager = RedisConnectionManager::new(config.url.as_str())?;
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(config.min_connections)
            .connection_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .build(manager)
            .await?;

        Ok(Self { pool })
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .context("Failed to acquire cache connection")?;
        redis::cmd("FLUSHDB")
            .exec_async(&mut *conn)
            .await
            .context("Failed to execute FLUSHDB command")
    }
}

impl CacheService for ValkeyCache {
    #[tracing::instrument(level = "trace", skip(self))]
    async fn increment(&self, key: &str, ttl: Duration) -> anyhow::Result<Counter> {
        let ttl_ms = u64::try_from(ttl.as_millis()).context("Counter ttl is too large")?;

        let mut conn = self
            .pool
            .get()
            .await
            .context("Failed to acquire cache connection")?;

        // NX only sets the expiry if the key has none, i.e. it was just created.
        let (value, pttl): (u64, i64) = redis::pipe()
            .atomic()
            .incr(key, 1u64)
            .cmd("PEXPIRE")
            .arg(key)
            .arg(ttl_ms)
            .arg("NX")
            .ignore()
            .pttl(key)
            .query_async(&mut *conn)
            .await
            .context("Failed to increment counter in cache")?;

        Ok(Counter {
            value,
            expires_in: Duration::from_millis(u64::try_from(pttl).unwrap_or(0)),
        })
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn ping(&self) -> anyhow::Result<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .context("Failed to acquire cache connection")?;

        redis::cmd("PING")
            .exec_async(&mut *conn)
            .await
            .context("Failed to ping cache")
    }
}
