//! Caller input validation.
//!
//! # Responsibility
//! - Reject malformed usernames, passwords, data names and values before any
//!   storage work (and before any password hashing) happens.
//!
//! # Invariants
//! - Validation never trims or rewrites input; accepted values are stored
//!   byte-for-byte.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const USERNAME_MAX_CHARS: usize = 64;
pub const PASSWORD_MAX_BYTES: usize = 1024;
pub const DATA_NAME_MAX_CHARS: usize = 128;
pub const DATA_VALUE_MAX_BYTES: usize = 1024 * 1024;

static CONTROL_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{Cc}]").expect("valid control char regex"));

/// Input field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
    DataName,
    DataValue,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::DataName => "dataName",
            Self::DataValue => "dataValue",
        }
    }
}

/// Caller-correctable input error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Missing(Field),
    TooLong { field: Field, max: usize },
    ControlCharacter(Field),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "missing required field `{}`", field.as_str()),
            Self::TooLong { field, max } => {
                write!(f, "field `{}` exceeds maximum length {max}", field.as_str())
            }
            Self::ControlCharacter(field) => {
                write!(f, "field `{}` contains control characters", field.as_str())
            }
        }
    }
}

impl Error for ValidationError {}

/// Validates an account name: 1..=64 chars, no control characters.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    validate_key(Field::Username, username, USERNAME_MAX_CHARS)
}

/// Validates a raw password: non-empty, at most 1024 bytes.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Missing(Field::Password));
    }
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(ValidationError::TooLong {
            field: Field::Password,
            max: PASSWORD_MAX_BYTES,
        });
    }
    Ok(())
}

/// Validates a record name: 1..=128 chars, no control characters.
pub fn validate_data_name(name: &str) -> Result<(), ValidationError> {
    validate_key(Field::DataName, name, DATA_NAME_MAX_CHARS)
}

/// Validates a record payload. Empty values are allowed.
pub fn validate_data_value(value: &str) -> Result<(), ValidationError> {
    if value.len() > DATA_VALUE_MAX_BYTES {
        return Err(ValidationError::TooLong {
            field: Field::DataValue,
            max: DATA_VALUE_MAX_BYTES,
        });
    }
    Ok(())
}

fn validate_key(field: Field, value: &str, max_chars: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    if value.chars().count() > max_chars {
        return Err(ValidationError::TooLong {
            field,
            max: max_chars,
        });
    }
    if CONTROL_CHAR_RE.is_match(value) {
        return Err(ValidationError::ControlCharacter(field));
    }
    Ok(())
}
