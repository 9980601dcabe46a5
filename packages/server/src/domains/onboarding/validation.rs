//! Field validation, checked when leaving a stage (not on every keystroke)

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use super::models::{ContactFields, JobFields};

pub const MIN_CREDENTIAL_LENGTH: usize = 6;
pub const MIN_PHONE_DIGITS: usize = 6;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Service,
    PostalCode,
    City,
    Description,
    FullName,
    Email,
    Phone,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Service => "Service",
            Field::PostalCode => "Postal code",
            Field::City => "City",
            Field::Description => "Description",
            Field::FullName => "Full name",
            Field::Email => "Email",
            Field::Phone => "Phone number",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(Field),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Phone number must start with + and contain at least 6 digits")]
    InvalidPhone,

    #[error("Password must be at least {min} characters")]
    CredentialTooShort { min: usize },
}

impl ValidationError {
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::InvalidEmail => "invalid_email",
            ValidationError::InvalidPhone => "invalid_phone",
            ValidationError::CredentialTooShort { .. } => "credential_too_short",
        }
    }

    /// The field the error points at, for highlighting in the form
    pub fn field(&self) -> Option<Field> {
        match self {
            ValidationError::MissingField(field) => Some(*field),
            ValidationError::InvalidEmail => Some(Field::Email),
            ValidationError::InvalidPhone => Some(Field::Phone),
            ValidationError::CredentialTooShort { .. } => None,
        }
    }
}

fn require(value: &str, field: Field) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// service, postal code, city and description must be non-blank
pub fn validate_job(job: &JobFields) -> Result<(), ValidationError> {
    require(&job.service, Field::Service)?;
    require(&job.postal_code, Field::PostalCode)?;
    require(&job.city, Field::City)?;
    require(&job.description, Field::Description)?;
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    require(email, Field::Email)?;
    if !EMAIL_PATTERN.is_match(email.trim()) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Leading `+` and at least six digits once everything but digits is stripped
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    require(phone, Field::Phone)?;
    let phone = phone.trim();
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !phone.starts_with('+') || digits < MIN_PHONE_DIGITS {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}

pub fn validate_contact(contact: &ContactFields) -> Result<(), ValidationError> {
    require(&contact.full_name, Field::FullName)?;
    validate_email(&contact.email)?;
    validate_phone(&contact.phone)?;
    Ok(())
}

pub fn validate_credential(credential: &str) -> Result<(), ValidationError> {
    if credential.chars().count() < MIN_CREDENTIAL_LENGTH {
        return Err(ValidationError::CredentialTooShort {
            min: MIN_CREDENTIAL_LENGTH,
        });
    }
    Ok(())
}
