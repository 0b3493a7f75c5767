use std::time::Duration;

use anyhow::bail;
use clap::Args;
use folio_client::{
    api::HttpContactApi,
    form::{ContactForm, SubmissionStatus},
};
use folio_models::contact::ContactField;
use url::Url;

#[derive(Debug, Args)]
pub struct ContactCommand {
    /// Url of the contact endpoint
    #[arg(
        long,
        env = "FOLIO_CONTACT_ENDPOINT",
        default_value = "http://localhost:3001/api/contact"
    )]
    endpoint: Url,
    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,
    /// Your name
    #[arg(long)]
    name: String,
    /// Address the site owner can reply to
    #[arg(long)]
    email: String,
    /// The message
    #[arg(long)]
    message: String,
}

impl ContactCommand {
    pub async fn invoke(self) -> anyhow::Result<()> {
        let api = HttpContactApi::new(self.endpoint, Duration::from_secs(self.timeout))?;

        let mut form = ContactForm::new(api);
        form.set_field(ContactField::Name, self.name);
        form.set_field(ContactField::Email, self.email);
        form.set_field(ContactField::Message, self.message);

        match form.submit().await.clone() {
            SubmissionStatus::Success(message) => {
                println!("{message}");
                Ok(())
            }
            SubmissionStatus::Error {
                message,
                is_config_error: true,
            } => bail!("{message} (the server needs to be reconfigured)"),
            SubmissionStatus::Error { message, .. } => bail!("{message}"),
            SubmissionStatus::Idle | SubmissionStatus::Submitting => {
                for err in form.errors() {
                    eprintln!("{}: {err}", err.field.as_str());
                }
                bail!("Invalid contact form")
            }
        }
    }
}
