//! Service configuration.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `USERVAULT_*` environment variables (e.g. `USERVAULT_DB_PATH`,
//! `USERVAULT_HASH_ITERATIONS`).

use crate::password::{PasswordHasher, DEFAULT_HASH_ITERATIONS, MIN_HASH_ITERATIONS};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "USERVAULT";

/// Runtime settings for the vault service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Longest wait for a storage lock before the request fails.
    pub busy_timeout_ms: u64,
    /// PBKDF2 rounds for newly hashed passwords.
    pub hash_iterations: u32,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("uservault.sqlite3"),
            busy_timeout_ms: 5_000,
            hash_iterations: DEFAULT_HASH_ITERATIONS,
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from an optional file plus environment overrides.
    ///
    /// An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let config: ServiceConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Message("db_path cannot be empty".into()));
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "busy_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.hash_iterations < MIN_HASH_ITERATIONS {
            return Err(ConfigError::Message(format!(
                "hash_iterations must be at least {MIN_HASH_ITERATIONS}"
            )));
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.hash_iterations)
    }
}
