use std::{future::Future, net::IpAddr, time::Duration};

use folio_models::contact::{FieldErrors, RawContactSubmission};
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Relays a contact form submission of the client at `client_ip` to the
    /// site owner via email.
    fn send_message(
        &self,
        client_ip: IpAddr,
        submission: RawContactSubmission,
    ) -> impl Future<Output = Result<(), ContactSendMessageError>> + Send;
}

#[derive(Debug, Error)]
pub enum ContactSendMessageError {
    #[error("Too many requests from this client.")]
    RateLimited { retry_after: Duration },
    #[error("Invalid submission: {0}")]
    Validation(FieldErrors),
    #[error("Email delivery is not configured.")]
    NotConfigured,
    #[error("The smtp server rejected the configured credentials.")]
    Authentication,
    #[error("Failed to send message.")]
    Send,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_send_message(
        mut self,
        client_ip: IpAddr,
        submission: RawContactSubmission,
        result: Result<(), ContactSendMessageError>,
    ) -> Self {
        self.expect_send_message()
            .once()
            .with(
                mockall::predicate::eq(client_ip),
                mockall::predicate::eq(submission),
            )
            .return_once(|_, _| Box::pin(std::future::ready(result)));
        self
    }
}
