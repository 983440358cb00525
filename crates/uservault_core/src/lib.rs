//! Core domain logic for UserVault.
//! This crate is the single source of truth for account and record invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod password;
pub mod repo;
pub mod service;

pub use config::ServiceConfig;
pub use db::{Database, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::account::{Account, AccountId};
pub use model::record::{DataEntry, PutOutcome, Record};
pub use model::validation::{Field, ValidationError};
pub use password::PasswordHasher;
pub use repo::credential_store::{CredentialStore, SqliteCredentialStore};
pub use repo::record_store::{RecordStore, SqliteRecordStore};
pub use repo::{StoreError, StoreResult};
pub use service::data_service::AuthenticatedDataService;
pub use service::error::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
