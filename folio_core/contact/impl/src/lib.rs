use std::{net::IpAddr, sync::Arc, time::Duration};

use folio_core_contact_contracts::{ContactFeatureService, ContactSendMessageError};
use folio_email_contracts::{Email, EmailSendError, EmailService};
use folio_models::{
    contact::{ContactSubmission, RawContactSubmission},
    email_address::EmailAddress,
};
use folio_shared_contracts::rate_limit::{RateLimitDecision, RateLimitService};
use folio_templates_contracts::{ContactEmailTemplate, TemplateService};
use tracing::{error, info, warn};


#[derive(Debug, Clone)]
pub struct ContactFeatureServiceImpl<RateLimit, Template, Email> {
    rate_limit: RateLimit,
    template: Template,
    /// `None` if no usable smtp credentials are configured.
    email: Option<Email>,
    config: ContactFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    /// Inbox contact messages are relayed to, `None` together with `email`.
    pub recipient: Option<Arc<EmailAddress>>,
    pub send_timeout: Duration,
}

impl<RateLimit, Template, Email> ContactFeatureServiceImpl<RateLimit, Template, Email> {
    pub fn new(
        rate_limit: RateLimit,
        template: Template,
        email: Option<Email>,
        config: ContactFeatureConfig,
    ) -> Self {
        Self {
            rate_limit,
            template,
            email,
            config,
        }
    }
}

impl<RateLimit, Template, EmailS> ContactFeatureService
    for ContactFeatureServiceImpl<RateLimit, Template, EmailS>
where
    RateLimit: RateLimitService,
    Template: TemplateService,
    EmailS: EmailService,
{
    #[tracing::instrument(skip(self, submission))]
    async fn send_message(
        &self,
        client_ip: IpAddr,
        submission: RawContactSubmission,
    ) -> Result<(), ContactSendMessageError> {
        if let RateLimitDecision::Limited { retry_after } = self
            .rate_limit
            .check(&format!("contact:{client_ip}"))
            .await?
        {
            return Err(ContactSendMessageError::RateLimited { retry_after });
        }

        let submission =
            ContactSubmission::parse(&submission).map_err(ContactSendMessageError::Validation)?;

        let (Some(email), Some(recipient)) = (&self.email, &self.config.recipient) else {
            warn!("Email not configured properly, dropping contact message");
            return Err(ContactSendMessageError::NotConfigured);
        };

        let message = self.compose(&submission, (**recipient).clone())?;

        match tokio::time::timeout(self.config.send_timeout, email.send(message)).await {
            Ok(Ok(())) => {
                info!("Relayed contact message");
                Ok(())
            }
            Ok(Err(EmailSendError::Authentication(err))) => {
                error!("Email authentication failed: {err:#}");
                Err(ContactSendMessageError::Authentication)
            }
            Ok(Err(EmailSendError::Other(err))) => {
                error!("Failed to send contact message: {err:#}");
                Err(ContactSendMessageError::Send)
            }
            Err(_) => {
                error!(timeout = ?self.config.send_timeout, "Timed out sending contact message");
                Err(ContactSendMessageError::Send)
            }
        }
    }
}

impl<RateLimit, Template, EmailS> ContactFeatureServiceImpl<RateLimit, Template, EmailS>
where
    Template: TemplateService,
{
    fn compose(
        &self,
        submission: &ContactSubmission,
        recipient: EmailAddress,
    ) -> anyhow::Result<Email> {
        let ContactSubmission {
            name,
            email,
            message,
        } = submission;

        let html_body = self.template.render(&ContactEmailTemplate {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })?;

        Ok(Email {
            recipient,
            subject: format!("Portfolio Contact: {name}"),
            body: format!("Name: {name}\nEmail: {email}\n\nMessage:\n{message}"),
            html_body: Some(html_body),
            reply_to: Some(email.clone()),
        })
    }
}
