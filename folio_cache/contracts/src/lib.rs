use std::{future::Future, time::Duration};

/// Key-value store for short lived counters shared between requests.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait CacheService: Send + Sync + 'static {
    /// Atomically increments the counter stored at `key` and returns its new
    /// state.
    ///
    /// A missing or expired counter starts again at `1` and expires after
    /// `ttl`. Incrementing a live counter does not extend its lifetime.
    fn increment(
        &self,
        key: &str,
        ttl: Duration,
    ) -> impl Future<Output = anyhow::Result<Counter>> + Send;

    /// Verify the connection to the cache.
    fn ping(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    pub value: u64,
    /// Time until the counter is reset.
    pub expires_in: Duration,
}

#[cfg(feature = "mock")]
impl MockCacheService {
    pub fn with_increment(mut self, key: String, ttl: Duration, result: Counter) -> Self {
        self.expect_increment()
            .once()
            .with(mockall::predicate::eq(key), mockall::predicate::eq(ttl))
            .return_once(move |_, _| Box::pin(std::future::ready(Ok(result))));
        self
    }

    pub fn with_increment_error(mut self, key: String, ttl: Duration) -> Self {
        self.expect_increment()
            .once()
            .with(mockall::predicate::eq(key), mockall::predicate::eq(ttl))
            .return_once(|_, _| {
                Box::pin(std::future::ready(Err(anyhow::anyhow!(
                    "cache connection refused"
                ))))
            });
        self
    }

    pub fn with_ping(mut self, ok: bool) -> Self {
        self.expect_ping().once().return_once(move || {
            Box::pin(std::future::ready(
                ok.then_some(())
                    .ok_or_else(|| anyhow::anyhow!("cache connection refused")),
            ))
        });
        self
    }
}
