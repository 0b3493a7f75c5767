use std::time::Duration;

use anyhow::Context;
use folio_cache_contracts::CacheService;
use folio_shared_contracts::rate_limit::{RateLimitDecision, RateLimitService};
use tracing::debug;

/// Fixed window rate limiter backed by the cache counters.
#[derive(Debug, Clone)]
pub struct RateLimitServiceImpl<Cache> {
    cache: Cache,
    config: RateLimitServiceConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitServiceConfig {
    pub max_requests: u64,
    pub window: Duration,
}

impl<Cache> RateLimitServiceImpl<Cache> {
    pub fn new(cache: Cache, config: RateLimitServiceConfig) -> Self {
        Self { cache, config }
    }
}

impl<Cache> RateLimitService for RateLimitServiceImpl<Cache>
where
    Cache: CacheService,
{
    #[tracing::instrument(level = "trace", skip(self))]
    async fn check(&self, key: &str) -> anyhow::Result<RateLimitDecision> {
        let counter = self
            .cache
            .increment(&format!("rate_limit:{key}"), self.config.window)
            .await
            .context("Failed to increment rate limit counter")?;

        if counter.value > self.config.max_requests {
            debug!(key, count = counter.value, "rate limit exceeded");
            return Ok(RateLimitDecision::Limited {
                retry_after: counter.expires_in,
            });
        }

        Ok(RateLimitDecision::Allowed {
            remaining: self.config.max_requests - counter.value,
        })
    }
}
