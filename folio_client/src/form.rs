use std::time::Duration;

use folio_models::contact::{
    ContactField, ContactSubmission, FieldError, FieldErrors, RawContactSubmission,
};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::api::{ContactApi, ContactResponseBody};

/// How long a success or error status is shown before the form reverts to
/// [`SubmissionStatus::Idle`].
pub const STATUS_DISPLAY_DURATION: Duration = Duration::from_secs(5);

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

const CONFIG_ERROR_CODES: [&str; 2] = ["email_not_configured", "email_authentication_failed"];
const CONFIG_ERROR_MESSAGES: [&str; 2] =
    ["Email service not configured", "Email authentication failed"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    Success(String),
    Error {
        message: String,
        /// The server cannot deliver messages until its operator intervenes.
        is_config_error: bool,
    },
}

#[derive(Debug)]
pub struct ContactForm<Api> {
    api: Api,
    values: RawContactSubmission,
    errors: Vec<FieldError>,
    status: SubmissionStatus,
    status_deadline: Option<Instant>,
    locked: bool,
}

impl<Api: ContactApi> ContactForm<Api> {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            values: Default::default(),
            errors: Vec::new(),
            status: SubmissionStatus::Idle,
            status_deadline: None,
            locked: false,
        }
    }

    pub fn values(&self) -> &RawContactSubmission {
        &self.values
    }

    pub fn value(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.values.name,
            ContactField::Email => &self.values.email,
            ContactField::Message => &self.values.message,
        }
    }

    /// Updates a field and clears the validation error shown for it.
    pub fn set_field(&mut self, field: ContactField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ContactField::Name => self.values.name = value,
            ContactField::Email => self.values.email = value,
            ContactField::Message => self.values.message = value,
        }
        self.errors.retain(|err| err.field != field);
    }

    /// Validation errors currently shown, in field order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error(&self, field: ContactField) -> Option<&FieldError> {
        self.errors.iter().find(|err| err.field == field)
    }

    /// Checks all fields without touching the form state.
    pub fn validate(&self) -> Result<ContactSubmission, FieldErrors> {
        ContactSubmission::parse(&self.values)
    }

    /// Whether submission is disabled after a configuration error.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn status(&mut self) -> &SubmissionStatus {
        self.expire_status();
        &self.status
    }

    /// Validates the form and, if successful, sends it to the server.
    ///
    /// Does nothing while locked or if a submission is already in flight.
    pub async fn submit(&mut self) -> &SubmissionStatus {
        self.expire_status();
        if self.locked || self.status == SubmissionStatus::Submitting {
            return &self.status;
        }

        if let Err(errors) = self.validate() {
            debug!("Contact form is invalid: {errors}");
            self.errors = errors.iter().copied().collect();
            return &self.status;
        }
        self.errors.clear();

        self.set_status(SubmissionStatus::Submitting);
        let in_flight = InFlight {
            status: &mut self.status,
            answered: false,
        };
        let result = self.api.send(self.values.clone()).await;
        in_flight.answered();

        let status = match result {
            Ok(response) if response.is_success() => {
                self.values = Default::default();
                SubmissionStatus::Success(
                    response
                        .body
                        .message
                        .unwrap_or_else(|| "Message sent successfully!".into()),
                )
            }
            Ok(response) => {
                let is_config_error = is_config_error(&response.body);
                if is_config_error {
                    warn!("Contact form disabled after configuration error");
                    self.locked = true;
                }
                let ContactResponseBody { message, error, .. } = response.body;
                SubmissionStatus::Error {
                    message: message
                        .or(error)
                        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.into()),
                    is_config_error,
                }
            }
            Err(err) => {
                warn!("Failed to submit contact form: {err:#}");
                SubmissionStatus::Error {
                    message: NETWORK_ERROR_MESSAGE.into(),
                    is_config_error: false,
                }
            }
        };

        self.set_status(status);
        &self.status
    }

    /// Sleeps until a displayed success or error status reverts to idle.
    pub async fn wait_status_reset(&mut self) {
        if let Some(deadline) = self.status_deadline {
            tokio::time::sleep_until(deadline).await;
        }
        self.expire_status();
    }

    /// Restores the initial state, as if the form was reloaded.
    pub fn reset(&mut self) {
        self.values = Default::default();
        self.errors.clear();
        self.set_status(SubmissionStatus::Idle);
        self.locked = false;
    }

    fn set_status(&mut self, status: SubmissionStatus) {
        self.status_deadline = matches!(
            status,
            SubmissionStatus::Success(_) | SubmissionStatus::Error { .. }
        )
        .then(|| Instant::now() + STATUS_DISPLAY_DURATION);
        self.status = status;
    }

    fn expire_status(&mut self) {
        if self
            .status_deadline
            .is_some_and(|deadline| deadline <= Instant::now())
        {
            self.set_status(SubmissionStatus::Idle);
        }
    }
}

/// Reverts the status to idle if the future driving a submission is dropped
/// before the server answered.
struct InFlight<'a> {
    status: &'a mut SubmissionStatus,
    answered: bool,
}

impl InFlight<'_> {
    fn answered(mut self) {
        self.answered = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.answered {
            debug!("Contact form submission was cancelled");
            *self.status = SubmissionStatus::Idle;
        }
    }
}

fn is_config_error(body: &ContactResponseBody) -> bool {
    body.code
        .as_deref()
        .is_some_and(|code| CONFIG_ERROR_CODES.contains(&code))
        || body.message.as_deref().is_some_and(|message| {
            CONFIG_ERROR_MESSAGES
                .iter()
                .any(|pattern| message.contains(pattern))
        })
}

#[cfg(test)]
mod tests {
    use folio_demo::{AL, INVALID_NAME};
    use folio_models::contact::FieldErrorKind;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::api::MockContactApi;

    fn filled(api: MockContactApi, values: &RawContactSubmission) -> ContactForm<MockContactApi> {
        let mut form = ContactForm::new(api);
        form.set_field(ContactField::Name, &values.name);
        form.set_field(ContactField::Email, &values.email);
        form.set_field(ContactField::Message, &values.message);
        form
    }

    fn body(message: &str, code: Option<&str>) -> ContactResponseBody {
        ContactResponseBody {
            success: false,
            message: Some(message.into()),
            error: None,
            code: code.map(Into::into),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn success() {
        // Arrange
        let api = MockContactApi::new().with_send(
            AL.clone(),
            200,
            ContactResponseBody {
                success: true,
                message: Some("Message sent successfully!".into()),
                ..Default::default()
            },
        );
        let mut sut = filled(api, &AL);

        // Act
        let status = sut.submit().await.clone();

        // Assert
        assert_eq!(
            status,
            SubmissionStatus::Success("Message sent successfully!".into())
        );
        assert_eq!(sut.values(), &RawContactSubmission::default());
        assert!(sut.errors().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn status_reverts_after_display_duration() {
        // Arrange
        let api = MockContactApi::new().with_send(
            AL.clone(),
            200,
            body("Message sent successfully!", None),
        );
        let mut sut = filled(api, &AL);
        sut.submit().await;

        // Act
        tokio::time::advance(STATUS_DISPLAY_DURATION - Duration::from_millis(1)).await;
        let before = sut.status().clone();
        tokio::time::advance(Duration::from_millis(1)).await;
        let after = sut.status().clone();

        // Assert
        assert_eq!(
            before,
            SubmissionStatus::Success("Message sent successfully!".into())
        );
        assert_eq!(after, SubmissionStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_status_reset() {
        // Arrange
        let api = MockContactApi::new().with_send(AL.clone(), 500, body("Nope", None));
        let mut sut = filled(api, &AL);
        sut.submit().await;
        let start = Instant::now();

        // Act
        sut.wait_status_reset().await;

        // Assert
        assert_eq!(sut.status(), &SubmissionStatus::Idle);
        assert_eq!(start.elapsed(), STATUS_DISPLAY_DURATION);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_input_is_not_sent() {
        // Arrange
        let mut sut = filled(MockContactApi::new(), &INVALID_NAME);

        // Act
        let status = sut.submit().await.clone();

        // Assert
        assert_eq!(status, SubmissionStatus::Idle);
        assert_eq!(sut.errors().len(), 1);
        assert_eq!(
            sut.error(ContactField::Name).unwrap().kind,
            FieldErrorKind::TooShort { min: 2 }
        );
        assert_eq!(sut.values(), &*INVALID_NAME);
    }

    #[tokio::test(start_paused = true)]
    async fn editing_clears_only_that_fields_error() {
        // Arrange
        let mut sut = ContactForm::new(MockContactApi::new());
        sut.submit().await;
        assert_eq!(sut.errors().len(), 3);

        // Act
        sut.set_field(ContactField::Email, "al@x.com");

        // Assert
        assert_eq!(
            sut.errors().iter().map(|err| err.field).collect::<Vec<_>>(),
            [ContactField::Name, ContactField::Message]
        );
    }

    #[test]
    fn validate_is_idempotent() {
        let sut = filled(MockContactApi::new(), &INVALID_NAME);
        assert_eq!(sut.validate(), sut.validate());
        assert!(sut.errors().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn config_errors_lock_the_form() {
        for response in [
            body(
                "Email service not configured. Please contact the administrator.",
                Some("email_not_configured"),
            ),
            body(
                "Email authentication failed. Please check your email credentials.",
                None,
            ),
            body("Credentials rejected", Some("email_authentication_failed")),
        ] {
            // Arrange
            let message = response.message.clone().unwrap();
            let api = MockContactApi::new().with_send(AL.clone(), 500, response);
            let mut sut = filled(api, &AL);

            // Act
            let first = sut.submit().await.clone();
            sut.wait_status_reset().await;
            let second = sut.submit().await.clone();

            // Assert
            assert_eq!(
                first,
                SubmissionStatus::Error {
                    message,
                    is_config_error: true
                }
            );
            assert!(sut.is_locked());
            assert_eq!(second, SubmissionStatus::Idle);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reset_unlocks_the_form() {
        // Arrange
        let api = MockContactApi::new().with_send(
            AL.clone(),
            500,
            body("Email service not configured.", Some("email_not_configured")),
        );
        let mut sut = filled(api, &AL);
        sut.submit().await;

        // Act
        sut.reset();

        // Assert
        assert!(!sut.is_locked());
        assert_eq!(sut.status(), &SubmissionStatus::Idle);
        assert_eq!(sut.values(), &RawContactSubmission::default());
    }

    #[tokio::test(start_paused = true)]
    async fn generic_errors() {
        for (status, response, expected) in [
            (
                500,
                body("Failed to send email. Please try again later.", Some("email_send_failed")),
                "Failed to send email. Please try again later.",
            ),
            (
                429,
                ContactResponseBody {
                    error: Some("Too many requests, please try again later.".into()),
                    ..Default::default()
                },
                "Too many requests, please try again later.",
            ),
            (502, ContactResponseBody::default(), FALLBACK_ERROR_MESSAGE),
        ] {
            // Arrange
            let api = MockContactApi::new().with_send(AL.clone(), status, response);
            let mut sut = filled(api, &AL);

            // Act
            let result = sut.submit().await.clone();

            // Assert
            assert_eq!(
                result,
                SubmissionStatus::Error {
                    message: expected.into(),
                    is_config_error: false
                }
            );
            assert!(!sut.is_locked());
            assert_eq!(sut.values(), &*AL);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn network_error() {
        // Arrange
        let mut api = MockContactApi::new();
        api.expect_send()
            .once()
            .return_once(|_| Box::pin(std::future::ready(Err(anyhow::anyhow!("connection refused")))));
        let mut sut = filled(api, &AL);

        // Act
        let result = sut.submit().await.clone();

        // Assert
        assert_eq!(
            result,
            SubmissionStatus::Error {
                message: NETWORK_ERROR_MESSAGE.into(),
                is_config_error: false
            }
        );
        assert!(!sut.is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn resubmit_after_error_restarts_display_timer() {
        // Arrange
        let mut api = MockContactApi::new();
        let mut seq = mockall::Sequence::new();
        for status in [500, 200] {
            api.expect_send()
                .once()
                .in_sequence(&mut seq)
                .return_once(move |_| {
                    Box::pin(std::future::ready(Ok(crate::api::ContactApiResponse {
                        status,
                        body: body("done", None),
                    })))
                });
        }
        let mut sut = filled(api, &AL);
        sut.submit().await;
        tokio::time::advance(Duration::from_secs(3)).await;

        // Act
        sut.submit().await;
        tokio::time::advance(Duration::from_secs(3)).await;

        // Assert
        assert_eq!(sut.status(), &SubmissionStatus::Success("done".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_submission_can_be_retried() {
        // Arrange
        let mut api = MockContactApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_send()
            .once()
            .in_sequence(&mut seq)
            .return_once(|_| Box::pin(std::future::pending()));
        api.expect_send()
            .once()
            .in_sequence(&mut seq)
            .return_once(|_| {
                Box::pin(std::future::ready(Ok(crate::api::ContactApiResponse {
                    status: 200,
                    body: body("Message sent successfully!", None),
                })))
            });
        let mut sut = filled(api, &AL);
        let cancelled = tokio::time::timeout(Duration::from_secs(30), sut.submit())
            .await
            .is_err();

        // Act
        let status = sut.submit().await.clone();

        // Assert
        assert!(cancelled);
        assert_eq!(
            status,
            SubmissionStatus::Success("Message sent successfully!".into())
        );
    }
}
