//! Store layer contracts and SQLite persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for accounts and records.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Uniqueness (usernames, per-owner record names) is enforced by storage
//!   constraints, never by an application-level read-then-write.
//! - Store APIs return semantic errors (`Conflict`, `NotFound`, `AuthFailed`)
//!   in addition to DB transport errors.

use crate::db::DbError;
use crate::password::MalformedHash;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod credential_store;
pub mod record_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Generic store error for credential and record operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Username already registered.
    Conflict(String),
    /// Unknown username, or no record for the requested name.
    NotFound(String),
    /// Unknown username or wrong password; intentionally not distinguished.
    AuthFailed,
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict(username) => write!(f, "username already exists: {username}"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::AuthFailed => write!(f, "invalid username or password"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<MalformedHash> for StoreError {
    fn from(value: MalformedHash) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Returns whether a SQLite error is a `UNIQUE` constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
