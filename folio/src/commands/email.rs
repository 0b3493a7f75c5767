use anyhow::Context;
use clap::Subcommand;
use folio_config::Config;
use folio_email_contracts::{Email, EmailService};
use folio_models::email_address::EmailAddress;

use crate::email;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Test email deliverability
    Test {
        /// Defaults to the configured contact recipient
        recipient: Option<EmailAddress>,
    },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { recipient } => test(config, recipient).await,
        }
    }
}

async fn test(config: Config, recipient: Option<EmailAddress>) -> anyhow::Result<()> {
    let recipient = recipient
        .or_else(|| config.email.recipient())
        .context("No recipient given and none configured")?;

    let email_service = email::connect(&config.email)
        .await?
        .context("Email is not configured")?;

    email_service
        .send(Email {
            recipient,
            subject: "Email Deliverability Test".into(),
            body: "Email deliverability seems to be working!".into(),
            html_body: None,
            reply_to: None,
        })
        .await
        .context("Failed to send email")?;

    Ok(())
}
