//! Credential store contract and SQLite implementation.
//!
//! # Responsibility
//! - Create accounts with salted adaptive password hashes.
//! - Verify username/password pairs.
//! - Resolve usernames to account ids for password-less operations.
//!
//! # Invariants
//! - Registration is a single INSERT; the `UNIQUE(username)` constraint decides
//!   races, so exactly one concurrent registration of a name succeeds.
//! - `verify` fails identically for unknown users and wrong passwords and does
//!   the same hashing work in both cases: every attempt burns at least the
//!   highest round count stored in `accounts.hash_cost`.
//! - A successful `verify` re-hashes passwords stored below the configured cost.

use super::{is_unique_violation, StoreError, StoreResult};
use crate::model::account::{Account, AccountId};
use crate::password::PasswordHasher;
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ACCOUNT_SELECT_SQL: &str = "SELECT
    id,
    username,
    password_hash,
    hash_cost,
    created_at
FROM accounts";

/// Repository interface for account operations.
pub trait CredentialStore {
    /// Creates an account; `Conflict` when the username is taken.
    fn register(&self, username: &str, password: &str) -> StoreResult<AccountId>;
    /// Checks credentials; `AuthFailed` for unknown user or wrong password.
    fn verify(&self, username: &str, password: &str) -> StoreResult<AccountId>;
    /// Resolves a username without a password; `NotFound` when absent.
    fn lookup(&self, username: &str) -> StoreResult<AccountId>;
}

/// SQLite-backed credential store.
pub struct SqliteCredentialStore<'conn> {
    conn: &'conn Connection,
    hasher: PasswordHasher,
}

impl<'conn> SqliteCredentialStore<'conn> {
    pub fn new(conn: &'conn Connection, hasher: PasswordHasher) -> Self {
        Self { conn, hasher }
    }

    /// Loads the full account row for a username.
    pub fn find_account(&self, username: &str) -> StoreResult<Option<Account>> {
        let account = self
            .conn
            .query_row(
                &format!("{ACCOUNT_SELECT_SQL} WHERE username = ?1;"),
                [username],
                parse_account_row,
            )
            .optional()?;
        Ok(account)
    }

    /// Round count every verification attempt must burn.
    fn verification_work(&self) -> StoreResult<u32> {
        let stored_max: u32 = self.conn.query_row(
            "SELECT COALESCE(MAX(hash_cost), 0) FROM accounts;",
            [],
            |row| row.get(0),
        )?;
        Ok(stored_max.max(self.hasher.iterations()))
    }

    /// Re-derives the hash at the configured cost. Failure keeps the old hash.
    fn upgrade_hash(&self, account: &Account, password: &str) {
        let password_hash = self.hasher.hash(password);
        let result = self.conn.execute(
            "UPDATE accounts
             SET password_hash = ?1, hash_cost = ?2
             WHERE id = ?3 AND password_hash = ?4;",
            params![
                password_hash,
                self.hasher.iterations(),
                account.id.0,
                account.password_hash
            ],
        );
        match result {
            Ok(_) => debug!(
                "event=account_rehash module=repo status=ok account_id={} from_cost={} to_cost={}",
                account.id,
                account.hash_cost,
                self.hasher.iterations()
            ),
            Err(err) => warn!(
                "event=account_rehash module=repo status=error account_id={} error={err}",
                account.id
            ),
        }
    }
}

impl CredentialStore for SqliteCredentialStore<'_> {
    fn register(&self, username: &str, password: &str) -> StoreResult<AccountId> {
        let password_hash = self.hasher.hash(password);

        match self.conn.execute(
            "INSERT INTO accounts (username, password_hash, hash_cost) VALUES (?1, ?2, ?3);",
            params![username, password_hash, self.hasher.iterations()],
        ) {
            Ok(_) => {
                let id = AccountId(self.conn.last_insert_rowid());
                debug!("event=account_register module=repo status=ok account_id={id}");
                Ok(id)
            }
            Err(err) if is_unique_violation(&err) => {
                debug!("event=account_register module=repo status=conflict");
                Err(StoreError::Conflict(username.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn verify(&self, username: &str, password: &str) -> StoreResult<AccountId> {
        let work = self.verification_work()?;
        let Some(account) = self.find_account(username)? else {
            self.hasher.dummy_verify(password, work);
            return Err(StoreError::AuthFailed);
        };

        match self
            .hasher
            .verify_with_work(password, &account.password_hash, work)
        {
            Ok(true) => {
                if self.hasher.needs_upgrade(account.hash_cost) {
                    self.upgrade_hash(&account, password);
                }
                Ok(account.id)
            }
            Ok(false) => Err(StoreError::AuthFailed),
            Err(err) => {
                warn!(
                    "event=account_verify module=repo status=error account_id={} error_code=malformed_hash",
                    account.id
                );
                Err(err.into())
            }
        }
    }

    fn lookup(&self, username: &str) -> StoreResult<AccountId> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM accounts WHERE username = ?1;",
                [username],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        id.map(AccountId)
            .ok_or_else(|| StoreError::NotFound(format!("user `{username}`")))
    }
}

fn parse_account_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: AccountId(row.get("id")?),
        username: row.get("username")?,
        password_hash: row.get("password_hash")?,
        hash_cost: row.get("hash_cost")?,
        created_at: row.get("created_at")?,
    })
}
