//! Shared validation helpers for inbound HTTP adapters.
//!
//! Domain validation enums are turned into `invalid_request` errors whose
//! `details` name the offending request field and a stable code.

use serde_json::json;

use crate::domain::{
    AuthValidationError, ComplaintId, ComplaintStatus, ComplaintValidationError, Error, Priority,
    Role, ThemePreference, UserId, UserValidationError,
};

/// Validation error codes for request fields that never reach the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidField,
    UnknownValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidField => "invalid_field",
            ErrorCode::UnknownValue => "unknown_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: Option<String>,
    message: String,
}

impl ValidationError {
    fn new(field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            field: field.map(str::to_owned),
            message: message.into(),
        }
    }

    fn with_code(self, code: &str) -> Error {
        let details = match self.field {
            Some(field) => json!({ "field": field, "code": code }),
            None => json!({ "code": code }),
        };
        Error::invalid_request(self.message).with_details(details)
    }

    fn with_value(self, code: ErrorCode, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code.as_str(),
        }))
    }
}

/// Map login, registration and profile update failures.
pub(crate) fn auth_validation_error(err: AuthValidationError) -> Error {
    ValidationError::new(err.field().map(|field| field.as_str()), err.to_string())
        .with_code(err.code())
}

fn complaint_code(err: &ComplaintValidationError) -> &'static str {
    match err {
        ComplaintValidationError::InvalidId => "invalid_id",
        ComplaintValidationError::TitleLength { .. } => "invalid_length",
        ComplaintValidationError::EmptyDescription | ComplaintValidationError::EmptyCategory => {
            "missing_field"
        }
        ComplaintValidationError::DescriptionTooLong { .. }
        | ComplaintValidationError::CategoryTooLong { .. }
        | ComplaintValidationError::NoteTooLong { .. } => "too_long",
        ComplaintValidationError::UnknownStatus { .. }
        | ComplaintValidationError::UnknownPriority { .. } => "unknown_value",
        ComplaintValidationError::EmptyEdit => "empty_edit",
    }
}

/// Map complaint value-object failures.
pub(crate) fn complaint_validation_error(err: ComplaintValidationError) -> Error {
    let code = complaint_code(&err);
    ValidationError::new(err.field(), err.to_string()).with_code(code)
}

/// Parse a `{id}` path segment into a [`ComplaintId`].
pub(crate) fn parse_complaint_id(raw: &str) -> Result<ComplaintId, Error> {
    ComplaintId::new(raw).map_err(|err| {
        ValidationError::new(Some("id"), err.to_string())
            .with_value(ErrorCode::InvalidField, raw)
    })
}

fn user_field_error(field: FieldName, err: UserValidationError, raw: &str) -> Error {
    let code = match err {
        UserValidationError::UnknownRole { .. } => ErrorCode::UnknownValue,
        _ => ErrorCode::InvalidField,
    };
    ValidationError::new(Some(field.as_str()), err.to_string()).with_value(code, raw)
}

/// Parse an optional role string; absent means [`Role::User`].
pub(crate) fn parse_role(raw: Option<&str>, field: FieldName) -> Result<Option<Role>, Error> {
    raw.map(|value| {
        value
            .parse::<Role>()
            .map_err(|err| user_field_error(field, err, value))
    })
    .transpose()
}

/// Parse an optional owner filter.
pub(crate) fn parse_user_id(raw: Option<&str>, field: FieldName) -> Result<Option<UserId>, Error> {
    raw.map(|value| UserId::new(value).map_err(|err| user_field_error(field, err, value)))
        .transpose()
}

/// Parse a status filter or status update.
pub(crate) fn parse_status(raw: &str) -> Result<ComplaintStatus, Error> {
    raw.parse::<ComplaintStatus>()
        .map_err(complaint_validation_error)
}

/// Parse an optional priority.
pub(crate) fn parse_priority(raw: Option<&str>) -> Result<Option<Priority>, Error> {
    raw.map(|value| value.parse::<Priority>().map_err(complaint_validation_error))
        .transpose()
}

/// Parse a theme preference.
pub(crate) fn parse_theme(raw: &str, field: FieldName) -> Result<ThemePreference, Error> {
    raw.parse::<ThemePreference>().map_err(|err| {
        ValidationError::new(Some(field.as_str()), err.to_string())
            .with_value(ErrorCode::UnknownValue, raw)
    })
}
