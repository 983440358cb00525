//! Service error taxonomy and its transport mapping.
//!
//! # Invariants
//! - `Auth` never says whether the username or the password was wrong.
//! - Every variant is terminal for the request; the core never retries.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use crate::repo::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Request-scoped failure returned by `AuthenticatedDataService`.
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed or missing input.
    Validation(ValidationError),
    /// Bad credentials.
    Auth,
    /// Username already registered.
    Conflict(String),
    /// Unknown account or record.
    NotFound(String),
    /// Storage/backend failure, including lock waits past `busy_timeout`.
    Internal(StoreError),
}

impl ServiceError {
    /// HTTP status a transport adapter should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Auth => 401,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code, used in log events and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::Auth => "auth_failed",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Internal(err) if is_busy(err) => "storage_timeout",
            Self::Internal(_) => "internal",
        }
    }

    /// Returns whether the request failed because storage stayed locked past
    /// the configured wait.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Internal(err) if is_busy(err))
    }
}

fn is_busy(err: &StoreError) -> bool {
    matches!(err, StoreError::Db(db) if db.is_busy())
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Auth => write!(f, "invalid username or password"),
            Self::Conflict(username) => write!(f, "username already exists: {username}"),
            Self::NotFound(what) => write!(f, "{what} not found"),
            Self::Internal(_) => write!(f, "internal storage error"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Internal(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::AuthFailed => Self::Auth,
            StoreError::Conflict(username) => Self::Conflict(username),
            StoreError::NotFound(what) => Self::NotFound(what),
            other => Self::Internal(other),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Internal(StoreError::Db(value))
    }
}
