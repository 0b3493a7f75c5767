use std::time::Duration;

use anyhow::Context;
use folio_cache_contracts::{CacheService, Counter};
use folio_cache_memory::MemoryCache;
use folio_cache_valkey::{ValkeyCache, ValkeyCacheConfig};
use folio_config::CacheConfig;
use tracing::info;

/// The cache backend selected by the config.
#[derive(Debug, Clone)]
pub enum Cache {
    Memory(MemoryCache),
    Valkey(ValkeyCache),
}

/// Connect to Valkey, or fall back to an in-process cache if none is
/// configured.
pub async fn connect(config: &CacheConfig) -> anyhow::Result<Cache> {
    let Some(valkey) = &config.valkey else {
        info!("No valkey server configured, keeping rate limit counters in memory");
        return Ok(Cache::Memory(MemoryCache::new()));
    };

    ValkeyCache::connect(&ValkeyCacheConfig {
        url: valkey.url.clone(),
        max_connections: valkey.max_connections,
        min_connections: valkey.min_connections,
        acquire_timeout: valkey.acquire_timeout.into(),
        idle_timeout: valkey.idle_timeout.map(Into::into),
        max_lifetime: valkey.max_lifetime.map(Into::into),
    })
    .await
    .map(Cache::Valkey)
    .context("Failed to connect to valkey")
}

impl CacheService for Cache {
    async fn increment(&self, key: &str, ttl: Duration) -> anyhow::Result<Counter> {
        match self {
            Self::Memory(cache) => cache.increment(key, ttl).await,
            Self::Valkey(cache) => cache.increment(key, ttl).await,
        }
    }

    async fn ping(&self) -> anyhow::Result<()> {
        match self {
            Self::Memory(cache) => cache.ping().await,
            Self::Valkey(cache) => cache.ping().await,
        }
    }
}
