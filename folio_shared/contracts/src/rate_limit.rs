use std::{future::Future, time::Duration};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RateLimitService: Send + Sync + 'static {
    /// Records one request for `key` and decides whether it is still within
    /// the limit of the current window.
    fn check(&self, key: &str) -> impl Future<Output = anyhow::Result<RateLimitDecision>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed {
        /// Number of requests still allowed in the current window.
        remaining: u64,
    },
    Limited {
        /// Time until the current window ends.
        retry_after: Duration,
    },
}

#[cfg(feature = "mock")]
impl MockRateLimitService {
    pub fn with_check(mut self, key: String, result: RateLimitDecision) -> Self {
        self.expect_check()
            .once()
            .with(mockall::predicate::eq(key))
            .return_once(move |_| Box::pin(std::future::ready(Ok(result))));
        self
    }

    pub fn with_check_error(mut self, key: String) -> Self {
        self.expect_check()
            .once()
            .with(mockall::predicate::eq(key))
            .return_once(|_| {
                Box::pin(std::future::ready(Err(anyhow::anyhow!(
                    "rate limit store unavailable"
                ))))
            });
        self
    }
}
