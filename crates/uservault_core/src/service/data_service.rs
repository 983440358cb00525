//! Authenticated data service.
//!
//! # Responsibility
//! - Re-authenticate every data request with the credentials it carries.
//! - Delegate record operations to the record store for the verified owner.
//!
//! # Invariants
//! - No session state survives a call; every `put`/`get` pays a full password
//!   hash. Introducing sessions changes the security posture and is out of
//!   scope here.
//! - `delete` and `list_names` resolve the owner by username only; `put` and
//!   `get` require the password. The asymmetry is kept as observed.
//! - Each call runs on its own connection; nothing is cached between calls.

use crate::config::ServiceConfig;
use crate::db::Database;
use crate::model::account::AccountId;
use crate::model::record::{DataEntry, PutOutcome};
use crate::model::validation::{
    validate_data_name, validate_data_value, validate_password, validate_username,
};
use crate::password::PasswordHasher;
use crate::repo::credential_store::{CredentialStore, SqliteCredentialStore};
use crate::repo::record_store::{RecordStore, SqliteRecordStore};
use crate::service::error::{ServiceError, ServiceResult};
use log::{error, info, warn};
use std::time::Instant;

/// Verify-then-act facade over the credential and record stores.
///
/// Construct once at startup and share by reference; the type is
/// `Send + Sync`.
#[derive(Debug, Clone)]
pub struct AuthenticatedDataService {
    db: Database,
    hasher: PasswordHasher,
}

impl AuthenticatedDataService {
    pub fn new(db: Database, hasher: PasswordHasher) -> Self {
        Self { db, hasher }
    }

    /// Opens (and migrates) the configured database and builds the service.
    pub fn from_config(config: &ServiceConfig) -> ServiceResult<Self> {
        let db = Database::open(config.db_path.clone(), config.busy_timeout())?;
        Ok(Self::new(db, config.hasher()))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Creates an account.
    pub fn register(&self, username: &str, password: &str) -> ServiceResult<AccountId> {
        let started_at = Instant::now();
        finish("register", started_at, self.register_inner(username, password))
    }

    /// Checks a credential pair without touching records.
    pub fn login(&self, username: &str, password: &str) -> ServiceResult<AccountId> {
        let started_at = Instant::now();
        finish("login", started_at, self.login_inner(username, password))
    }

    /// Verifies credentials, then inserts or replaces `name` for the caller.
    pub fn put(
        &self,
        username: &str,
        password: &str,
        name: &str,
        value: &str,
    ) -> ServiceResult<PutOutcome> {
        let started_at = Instant::now();
        finish(
            "put",
            started_at,
            self.put_inner(username, password, name, value),
        )
    }

    /// Verifies credentials, then reads `name` for the caller.
    pub fn get(&self, username: &str, password: &str, name: &str) -> ServiceResult<DataEntry> {
        let started_at = Instant::now();
        finish("get", started_at, self.get_inner(username, password, name))
    }

    /// Removes `name` for the named account. Succeeds when nothing was stored.
    ///
    /// No password is required; unknown usernames fail with `NotFound`.
    pub fn delete(&self, username: &str, name: &str) -> ServiceResult<()> {
        let started_at = Instant::now();
        finish("delete", started_at, self.delete_inner(username, name))
    }

    /// Lists every record name of the named account.
    ///
    /// No password is required; unknown usernames fail with `NotFound`.
    pub fn list_names(&self, username: &str) -> ServiceResult<Vec<String>> {
        let started_at = Instant::now();
        finish("list_names", started_at, self.list_names_inner(username))
    }

    fn register_inner(&self, username: &str, password: &str) -> ServiceResult<AccountId> {
        validate_username(username)?;
        validate_password(password)?;
        let conn = self.db.connect()?;
        let credentials = SqliteCredentialStore::new(&conn, self.hasher);
        Ok(credentials.register(username, password)?)
    }

    fn login_inner(&self, username: &str, password: &str) -> ServiceResult<AccountId> {
        validate_username(username)?;
        validate_password(password)?;
        let conn = self.db.connect()?;
        let credentials = SqliteCredentialStore::new(&conn, self.hasher);
        Ok(credentials.verify(username, password)?)
    }

    fn put_inner(
        &self,
        username: &str,
        password: &str,
        name: &str,
        value: &str,
    ) -> ServiceResult<PutOutcome> {
        validate_username(username)?;
        validate_password(password)?;
        validate_data_name(name)?;
        validate_data_value(value)?;
        let mut conn = self.db.connect()?;
        let owner = SqliteCredentialStore::new(&conn, self.hasher).verify(username, password)?;
        Ok(SqliteRecordStore::new(&mut conn).put(owner, name, value)?)
    }

    fn get_inner(&self, username: &str, password: &str, name: &str) -> ServiceResult<DataEntry> {
        validate_username(username)?;
        validate_password(password)?;
        validate_data_name(name)?;
        let mut conn = self.db.connect()?;
        let owner = SqliteCredentialStore::new(&conn, self.hasher).verify(username, password)?;
        let value = SqliteRecordStore::new(&mut conn).get(owner, name)?;
        Ok(DataEntry {
            data_name: name.to_string(),
            data_value: value,
        })
    }

    fn delete_inner(&self, username: &str, name: &str) -> ServiceResult<()> {
        validate_username(username)?;
        validate_data_name(name)?;
        let mut conn = self.db.connect()?;
        let owner = SqliteCredentialStore::new(&conn, self.hasher).lookup(username)?;
        SqliteRecordStore::new(&mut conn).delete(owner, name)?;
        Ok(())
    }

    fn list_names_inner(&self, username: &str) -> ServiceResult<Vec<String>> {
        validate_username(username)?;
        let mut conn = self.db.connect()?;
        let owner = SqliteCredentialStore::new(&conn, self.hasher).lookup(username)?;
        Ok(SqliteRecordStore::new(&mut conn).list_names(owner)?)
    }
}

fn finish<T>(op: &str, started_at: Instant, result: ServiceResult<T>) -> ServiceResult<T> {
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!(
            "event=service_call module=service op={op} status=ok duration_ms={duration_ms}"
        ),
        Err(err) => {
            if let ServiceError::Internal(source) = err {
                error!(
                    "event=service_call module=service op={op} status=error duration_ms={duration_ms} error_code={} error={source}",
                    err.code()
                );
            } else {
                warn!(
                    "event=service_call module=service op={op} status=rejected duration_ms={duration_ms} error_code={}",
                    err.code()
                );
            }
        }
    }
    result
}
