use std::{sync::Arc, time::Duration};

use folio_cache_contracts::CacheService;
use folio_core_health_contracts::{HealthFeatureService, HealthStatus};
use folio_email_contracts::EmailService;
use tokio::{sync::RwLock, time::Instant};
use tracing::error;

#[derive(Debug, Clone)]
pub struct HealthFeatureServiceImpl<Cache, Email> {
    cache: Cache,
    email: Option<Email>,
    config: HealthFeatureConfig,
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct HealthFeatureConfig {
    pub cache_ttl: Duration,
}

#[derive(Debug, Default)]
struct State {
    cache: RwLock<Option<CachedStatus>>,
}

#[derive(Debug)]
struct CachedStatus {
    status: HealthStatus,
    timestamp: Instant,
}

impl<Cache, Email> HealthFeatureServiceImpl<Cache, Email> {
    pub fn new(cache: Cache, email: Option<Email>, config: HealthFeatureConfig) -> Self {
        Self {
            cache,
            email,
            config,
            state: Default::default(),
        }
    }
}

impl<Cache, Email> HealthFeatureService for HealthFeatureServiceImpl<Cache, Email>
where
    Cache: CacheService,
    Email: EmailService,
{
    async fn get_status(&self) -> HealthStatus {
        let now = Instant::now();
        let is_fresh = |cached: &&CachedStatus| now < cached.timestamp + self.config.cache_ttl;

        let cache_guard = self.state.cache.read().await;
        if let Some(cached) = cache_guard.as_ref().filter(is_fresh) {
            return cached.status;
        }
        drop(cache_guard);

        let mut cache_guard = self.state.cache.write().await;
        if let Some(cached) = cache_guard.as_ref().filter(is_fresh) {
            return cached.status;
        }

        let cache = self
            .cache
            .ping()
            .await
            .inspect_err(|err| error!("Failed to ping cache: {err}"))
            .is_ok();

        let email = match &self.email {
            Some(email) => email
                .ping()
                .await
                .inspect_err(|err| error!("Failed to ping smtp server: {err}"))
                .is_ok(),
            None => false,
        };

        let status = HealthStatus { cache, email };

        cache_guard
            .insert(CachedStatus {
                status,
                timestamp: now,
            })
            .status
    }
}

#[cfg(test)]
mod tests {
    use folio_cache_contracts::MockCacheService;
    use folio_email_contracts::MockEmailService;

    use super::*;

    type Sut = HealthFeatureServiceImpl<MockCacheService, MockEmailService>;

    const CACHE_TTL: Duration = Duration::from_secs(2);

    fn sut(cache: MockCacheService, email: Option<MockEmailService>) -> Sut {
        HealthFeatureServiceImpl::new(
            cache,
            email,
            HealthFeatureConfig {
                cache_ttl: CACHE_TTL,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn healthy() {
        // Arrange
        let sut = sut(
            MockCacheService::new().with_ping(true),
            Some(MockEmailService::new().with_ping(true)),
        );

        // Act
        let result = sut.get_status().await;

        // Assert
        assert_eq!(
            result,
            HealthStatus {
                cache: true,
                email: true
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unhealthy() {
        // Arrange
        let sut = sut(
            MockCacheService::new().with_ping(false),
            Some(MockEmailService::new().with_ping(false)),
        );

        // Act
        let result = sut.get_status().await;

        // Assert
        assert_eq!(
            result,
            HealthStatus {
                cache: false,
                email: false
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn email_not_configured() {
        // Arrange
        let sut = sut(MockCacheService::new().with_ping(true), None);

        // Act
        let result = sut.get_status().await;

        // Assert
        assert_eq!(
            result,
            HealthStatus {
                cache: true,
                email: false
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cached() {
        // Arrange
        let sut = sut(
            MockCacheService::new().with_ping(true),
            Some(MockEmailService::new().with_ping(false)),
        );

        // Act
        let first = sut.get_status().await;
        tokio::time::advance(CACHE_TTL / 2).await;
        let second = sut.get_status().await;

        // Assert
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn cache_expired() {
        // Arrange
        let mut cache = MockCacheService::new();
        let mut seq = mockall::Sequence::new();
        for ok in [true, false] {
            cache
                .expect_ping()
                .once()
                .in_sequence(&mut seq)
                .return_once(move || {
                    Box::pin(std::future::ready(
                        ok.then_some(()).ok_or_else(|| anyhow::anyhow!("down")),
                    ))
                });
        }
        let sut = sut(cache, None);

        // Act
        let first = sut.get_status().await;
        tokio::time::advance(CACHE_TTL).await;
        let second = sut.get_status().await;

        // Assert
        assert!(first.cache);
        assert!(!second.cache);
    }
}
