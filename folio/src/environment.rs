use std::{net::SocketAddr, sync::Arc};

use folio_api_rest::{RestServerConfig, RestServerRealIpConfig};
use folio_config::Config;
use folio_core_contact_impl::{ContactFeatureConfig, ContactFeatureServiceImpl};
use folio_core_health_impl::{HealthFeatureConfig, HealthFeatureServiceImpl};
use folio_email_impl::EmailServiceImpl;
use folio_shared_impl::rate_limit::{RateLimitServiceConfig, RateLimitServiceImpl};
use folio_templates_impl::TemplateServiceImpl;
use tracing::warn;

pub type Cache = crate::cache::Cache;
pub type Email = EmailServiceImpl;
pub type Template = TemplateServiceImpl;
pub type RateLimit = RateLimitServiceImpl<Cache>;

pub type Health = HealthFeatureServiceImpl<Cache, Email>;
pub type Contact = ContactFeatureServiceImpl<RateLimit, Template, Email>;

pub type RestServer = folio_api_rest::RestServer<Health, Contact>;

/// Wire up all services for the http server.
pub fn rest_server(config: &Config, cache: Cache, email: Option<Email>) -> anyhow::Result<RestServer> {
    let rest_server_config = RestServerConfig {
        addr: SocketAddr::new(config.http.host, config.http.port),
        real_ip_config: config.http.real_ip.as_ref().map(|real_ip_config| {
            Arc::new(RestServerRealIpConfig {
                header: real_ip_config.header.clone(),
                set_from: real_ip_config.set_from,
            })
        }),
    };

    let recipient = match email {
        Some(_) => {
            let recipient = config.email.recipient();
            if recipient.is_none() {
                warn!("No valid recipient configured, set email.recipient");
            }
            recipient
        }
        None => None,
    };

    let rate_limit = RateLimitServiceImpl::new(
        cache.clone(),
        RateLimitServiceConfig {
            max_requests: config.contact.rate_limit.max_requests,
            window: config.contact.rate_limit.window.into(),
        },
    );

    let contact = ContactFeatureServiceImpl::new(
        rate_limit,
        TemplateServiceImpl::new()?,
        email.clone(),
        ContactFeatureConfig {
            recipient: recipient.map(Arc::new),
            send_timeout: config.email.timeout.into(),
        },
    );

    let health = HealthFeatureServiceImpl::new(
        cache,
        email,
        HealthFeatureConfig {
            cache_ttl: config.health.cache_ttl.into(),
        },
    );

    Ok(RestServer::new(rest_server_config, health, contact))
}

#[cfg(test)]
mod tests {
    use folio_cache_memory::MemoryCache;

    use super::*;

    #[test]
    fn build_rest_server() {
        let config = folio_config::load(&[folio_config::DEFAULT_CONFIG_PATH]).unwrap();
        let _: RestServer = rest_server(&config, Cache::Memory(MemoryCache::new()), None).unwrap();
    }
}
