use folio_models::contact::{ContactField, FieldError, RawContactSubmission};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiContactMessage {
    /// Full name of the sender
    pub name: String,
    /// Email address replies are sent to
    pub email: String,
    /// Content of the message
    pub message: String,
}

impl From<ApiContactMessage> for RawContactSubmission {
    fn from(value: ApiContactMessage) -> Self {
        Self {
            name: value.name,
            email: value.email,
            message: value.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiFieldError {
    pub field: ContactField,
    pub code: &'static str,
    pub message: String,
}

impl From<&FieldError> for ApiFieldError {
    fn from(value: &FieldError) -> Self {
        Self {
            field: value.field,
            code: value.code(),
            message: value.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiRateLimited {
    pub error: &'static str,
}
