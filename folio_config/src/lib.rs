use std::{net::IpAddr, path::Path};

use anyhow::Context;
use config::{File, FileFormat};
use folio_models::email_address::EmailAddress;
use serde::Deserialize;

pub use duration::Duration;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Values that ship in `.env` templates and must never be used as credentials.
const PLACEHOLDER_USER: &str = "your-email@gmail.com";
const PLACEHOLDER_PASS: &str = "your-app-password";

/// Load the config files at `paths` (later files take precedence) and apply
/// overrides from the process environment.
pub fn load(paths: &[impl AsRef<Path>]) -> anyhow::Result<Config> {
    load_with_env(paths, |key| std::env::var(key).ok())
}

/// Like [`load`], but reads environment overrides through `env`.
pub fn load_with_env(
    paths: &[impl AsRef<Path>],
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Config> {
    let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());

    let builder = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?;

    let port = env("PORT")
        .map(|port| port.parse::<u16>())
        .transpose()
        .context("Failed to parse PORT")?;

    builder
        .set_override_option("http.port", port.map(i64::from))?
        .set_override_option("email.user", env("EMAIL_USER"))?
        .set_override_option("email.pass", env("EMAIL_PASS"))?
        .set_override_option("email.service", env("EMAIL_SERVICE"))?
        .set_override_option("email.recipient", env("EMAIL_RECIPIENT"))?
        .set_override_option("email.smtp_url", env("EMAIL_SMTP_URL"))?
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub cache: CacheConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub health: HealthConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    pub real_ip: Option<RealIpConfig>,
}

#[derive(Debug, Deserialize)]
pub struct RealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    /// Counters are kept in process memory if no valkey server is configured.
    pub valkey: Option<ValkeyConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ValkeyConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    pub user: Option<String>,
    pub pass: Option<String>,
    /// Name of a well known provider or host name of the smtp relay.
    pub service: String,
    /// Full smtp url including credentials, takes precedence over `service`.
    pub smtp_url: Option<String>,
    /// Sender address, defaults to `user`.
    pub from: Option<EmailAddress>,
    /// Inbox for contact messages, defaults to `user`.
    pub recipient: Option<EmailAddress>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailCredentials<'a> {
    pub user: &'a str,
    pub pass: &'a str,
}

impl EmailConfig {
    /// Returns the smtp credentials unless they are missing, empty or still
    /// set to the placeholder values.
    pub fn credentials(&self) -> Option<EmailCredentials<'_>> {
        let user = self.user.as_deref().map(str::trim)?;
        let pass = self.pass.as_deref().map(str::trim)?;

        let usable = !user.is_empty()
            && !pass.is_empty()
            && user != PLACEHOLDER_USER
            && pass != PLACEHOLDER_PASS;
        usable.then_some(EmailCredentials { user, pass })
    }

    /// Whether delivery can be attempted at all.
    pub fn is_configured(&self) -> bool {
        self.smtp_url.is_some() || self.credentials().is_some()
    }

    pub fn sender(&self) -> Option<EmailAddress> {
        self.from.clone().or_else(|| self.user_address())
    }

    pub fn recipient(&self) -> Option<EmailAddress> {
        self.recipient.clone().or_else(|| self.user_address())
    }

    fn user_address(&self) -> Option<EmailAddress> {
        self.credentials()?.user.parse().ok()
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u64,
    pub window: Duration,
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}
