use anyhow::Context;
use folio_config::EmailConfig;
use folio_email_impl::{EmailServiceImpl, EmailServiceImplConfig, SmtpEndpoint};
use tracing::{info, warn};

/// Configure the smtp transport.
///
/// Returns `None` if no usable credentials are configured, in which case
/// contact messages are rejected instead of being sent.
pub async fn connect(config: &EmailConfig) -> anyhow::Result<Option<EmailServiceImpl>> {
    let Some(endpoint) = endpoint(config) else {
        warn!("Email credentials are missing or still set to placeholder values");
        return Ok(None);
    };

    let Some(from) = config.sender() else {
        warn!("No valid sender address configured, set email.from");
        return Ok(None);
    };

    let service = EmailServiceImpl::new(EmailServiceImplConfig {
        endpoint,
        from,
        timeout: config.timeout.into(),
    })
    .await
    .context("Failed to configure smtp transport")?;

    info!("Email configuration loaded successfully");
    Ok(Some(service))
}

fn endpoint(config: &EmailConfig) -> Option<SmtpEndpoint> {
    if let Some(smtp_url) = &config.smtp_url {
        return Some(SmtpEndpoint::Url(smtp_url.clone()));
    }

    let credentials = config.credentials()?;
    Some(SmtpEndpoint::Service {
        service: config.service.clone(),
        user: credentials.user.into(),
        pass: credentials.pass.into(),
    })
}
