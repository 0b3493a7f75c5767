use folio_cache_contracts::CacheService;
use folio_config::Config;
use folio_email_contracts::EmailService;
use tracing::{info, warn};

use crate::{cache, email, environment};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Connecting to cache");
    let cache = cache::connect(&config.cache).await?;
    cache.ping().await?;

    info!("Configuring smtp transport");
    let email = email::connect(&config.email).await?;
    if let Some(email) = &email {
        if let Err(err) = email.ping().await {
            warn!("Failed to ping smtp server: {err:#}");
        }
    }

    let server = environment::rest_server(&config, cache, email)?;
    info!(
        "Starting http server on {}:{}",
        config.http.host, config.http.port
    );
    server.serve().await
}
