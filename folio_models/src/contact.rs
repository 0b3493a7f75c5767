use std::sync::LazyLock;

use nutype::nutype;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::email_address::EmailAddress;

/// A contact form submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: ContactName,
    pub email: EmailAddress,
    pub message: ContactMessageBody,
}

/// The contact form fields exactly as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[nutype(
    sanitize(trim),
    validate(len_char_min = 2, len_char_max = 100),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Display, Serialize)
)]
pub struct ContactName(String);

impl ContactName {
    pub const MIN_LEN: usize = 2;
    pub const MAX_LEN: usize = 100;
}

#[nutype(
    sanitize(trim),
    validate(len_char_min = 10, len_char_max = 1000),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Display, Serialize)
)]
pub struct ContactMessageBody(String);

impl ContactMessageBody {
    pub const MIN_LEN: usize = 10;
    pub const MAX_LEN: usize = 1000;
}

pub static CONTACT_EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl ContactField {
    pub const ALL: [Self; 3] = [Self::Name, Self::Email, Self::Message];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Message => "Message",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: ContactField,
    pub kind: FieldErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidEmail,
}

impl FieldError {
    /// Machine readable identifier of the violated rule.
    pub fn code(&self) -> &'static str {
        match self.kind {
            FieldErrorKind::TooShort { .. } => "too_short",
            FieldErrorKind::TooLong { .. } => "too_long",
            FieldErrorKind::InvalidEmail => "invalid_email",
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = self.field.label();
        match self.kind {
            FieldErrorKind::TooShort { min } => {
                write!(f, "{label} must be at least {min} characters")
            }
            FieldErrorKind::TooLong { max } => write!(f, "{label} must be at most {max} characters"),
            FieldErrorKind::InvalidEmail => write!(f, "Please enter a valid email address"),
        }
    }
}

/// Validation errors of a submission, at most one per field, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn get(&self, field: ContactField) -> Option<&FieldError> {
        self.0.iter().find(|err| err.field == field)
    }

    pub fn fields(&self) -> impl Iterator<Item = ContactField> + '_ {
        self.0.iter().map(|err| err.field)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            err.fmt(f)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl ContactSubmission {
    /// Validates all fields of `raw` independently and collects every
    /// violation instead of stopping at the first one.
    pub fn parse(raw: &RawContactSubmission) -> Result<Self, FieldErrors> {
        let name = ContactName::try_new(raw.name.clone()).map_err(|err| FieldError {
            field: ContactField::Name,
            kind: match err {
                ContactNameError::LenCharMinViolated => FieldErrorKind::TooShort {
                    min: ContactName::MIN_LEN,
                },
                ContactNameError::LenCharMaxViolated => FieldErrorKind::TooLong {
                    max: ContactName::MAX_LEN,
                },
            },
        });

        let email = parse_email(&raw.email).ok_or(FieldError {
            field: ContactField::Email,
            kind: FieldErrorKind::InvalidEmail,
        });

        let message = ContactMessageBody::try_new(raw.message.clone()).map_err(|err| FieldError {
            field: ContactField::Message,
            kind: match err {
                ContactMessageBodyError::LenCharMinViolated => FieldErrorKind::TooShort {
                    min: ContactMessageBody::MIN_LEN,
                },
                ContactMessageBodyError::LenCharMaxViolated => FieldErrorKind::TooLong {
                    max: ContactMessageBody::MAX_LEN,
                },
            },
        });

        match (name, email, message) {
            (Ok(name), Ok(email), Ok(message)) => Ok(Self {
                name,
                email,
                message,
            }),
            (name, email, message) => Err(FieldErrors(
                [name.err(), email.err(), message.err()]
                    .into_iter()
                    .flatten()
                    .collect(),
            )),
        }
    }
}

impl From<&ContactSubmission> for RawContactSubmission {
    fn from(value: &ContactSubmission) -> Self {
        Self {
            name: value.name.to_string(),
            email: value.email.to_string(),
            message: value.message.to_string(),
        }
    }
}

fn parse_email(raw: &str) -> Option<EmailAddress> {
    let raw = raw.trim();
    CONTACT_EMAIL_REGEX
        .is_match(raw)
        .then(|| raw.parse().ok())
        .flatten()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn raw(name: &str, email: &str, message: &str) -> RawContactSubmission {
        RawContactSubmission {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    fn failed_fields(raw: &RawContactSubmission) -> Vec<ContactField> {
        ContactSubmission::parse(raw).unwrap_err().fields().collect()
    }

    #[test]
    fn valid() {
        let submission = ContactSubmission::parse(&raw("Al", "al@x.com", "Hello there!")).unwrap();

        assert_eq!(*submission.name, "Al");
        assert_eq!(submission.email.as_str(), "al@x.com");
        assert_eq!(*submission.message, "Hello there!");
    }

    #[test]
    fn values_are_trimmed() {
        let submission =
            ContactSubmission::parse(&raw("  Al  ", " al@x.com ", "\n Hello there! \n")).unwrap();

        assert_eq!(*submission.name, "Al");
        assert_eq!(submission.email.as_str(), "al@x.com");
        assert_eq!(*submission.message, "Hello there!");
    }

    #[test]
    fn name_too_short_only() {
        let errors = ContactSubmission::parse(&raw("A", "al@x.com", "Hello there!")).unwrap_err();

        assert_eq!(errors.len(), 1);
        let err = errors.get(ContactField::Name).unwrap();
        assert_eq!(err.kind, FieldErrorKind::TooShort { min: 2 });
        assert_eq!(err.code(), "too_short");
        assert_eq!(err.to_string(), "Name must be at least 2 characters");
    }

    #[test]
    fn length_bounds() {
        for (name, ok) in [
            ("A".repeat(1), false),
            ("A".repeat(2), true),
            ("A".repeat(100), true),
            ("A".repeat(101), false),
            (" A ".into(), false),
            ("ÄÖ".into(), true),
        ] {
            let result = ContactSubmission::parse(&raw(&name, "al@x.com", "Hello there!"));
            assert_eq!(result.is_ok(), ok, "name = {name:?}");
        }

        for (message, ok) in [
            ("x".repeat(9), false),
            ("x".repeat(10), true),
            ("x".repeat(1000), true),
            ("x".repeat(1001), false),
        ] {
            let result = ContactSubmission::parse(&raw("Al", "al@x.com", &message));
            assert_eq!(result.is_ok(), ok, "message length = {}", message.len());
        }
    }

    #[test]
    fn too_long_messages() {
        let errors = ContactSubmission::parse(&raw(
            &"A".repeat(101),
            "al@x.com",
            &"x".repeat(1001),
        ))
        .unwrap_err();

        assert_eq!(
            errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            [
                "Name must be at most 100 characters",
                "Message must be at most 1000 characters"
            ]
        );
    }

    #[test]
    fn invalid_emails() {
        for email in [
            "",
            "al",
            "al@x",
            "@x.com",
            "al@.com",
            "al x@x.com",
            "al@@x.com",
            "al@x.com@y.com",
        ] {
            assert_eq!(
                failed_fields(&raw("Al", email, "Hello there!")),
                [ContactField::Email],
                "email = {email:?}"
            );
        }
    }

    #[test]
    fn all_errors_at_once() {
        let errors = ContactSubmission::parse(&RawContactSubmission::default()).unwrap_err();

        assert_eq!(errors.fields().collect::<Vec<_>>(), ContactField::ALL);
        assert_eq!(
            errors.to_string(),
            "Name must be at least 2 characters; Please enter a valid email address; Message \
             must be at least 10 characters"
        );
    }

    #[test]
    fn idempotent() {
        let input = raw("A", "nope", "short");
        assert_eq!(
            ContactSubmission::parse(&input),
            ContactSubmission::parse(&input)
        );
    }

    #[test]
    fn raw_deserialize_missing_fields() {
        let raw = serde_json::from_str::<RawContactSubmission>(r#"{"name": "Al"}"#).unwrap();
        assert_eq!(raw, self::raw("Al", "", ""));
    }
}
