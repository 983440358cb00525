//! Record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Upsert, read, list and delete named values scoped to one owner.
//!
//! # Invariants
//! - `put` runs in one IMMEDIATE transaction: the insert is absorbed by the
//!   `UNIQUE(account_id, name)` constraint and the in-place update happens
//!   under the same write lock. No duplicate rows, no lost writers.
//! - Replacing a value keeps the row `id`.
//! - `delete` is idempotent.
//! - Timestamps are Unix epoch milliseconds at millisecond resolution.

use super::{StoreError, StoreResult};
use crate::model::account::AccountId;
use crate::model::record::{PutOutcome, Record};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

/// Repository interface for per-owner named values.
pub trait RecordStore {
    /// Inserts or replaces the value stored under `name` for `owner`.
    fn put(&mut self, owner: AccountId, name: &str, value: &str) -> StoreResult<PutOutcome>;
    /// Returns the stored value; `NotFound` when absent.
    fn get(&self, owner: AccountId, name: &str) -> StoreResult<String>;
    /// Returns the full row, if any.
    fn get_record(&self, owner: AccountId, name: &str) -> StoreResult<Option<Record>>;
    /// Removes the record. Returns whether a row existed.
    fn delete(&mut self, owner: AccountId, name: &str) -> StoreResult<bool>;
    /// Lists every name owned by `owner`, sorted.
    fn list_names(&self, owner: AccountId) -> StoreResult<Vec<String>>;
}

/// SQLite-backed record store.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn put(&mut self, owner: AccountId, name: &str, value: &str) -> StoreResult<PutOutcome> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = tx
            .execute(
                "INSERT INTO records (account_id, name, value)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (account_id, name) DO NOTHING;",
                params![owner.0, name, value],
            )
            .map_err(|err| map_owner_error(err, owner))?;

        let outcome = if inserted == 1 {
            PutOutcome::Created
        } else {
            let changed = tx.execute(
                "UPDATE records
                 SET
                    value = ?3,
                    updated_at = CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)
                 WHERE account_id = ?1
                   AND name = ?2;",
                params![owner.0, name, value],
            )?;
            if changed != 1 {
                return Err(StoreError::InvalidData(format!(
                    "upsert for account {owner} touched {changed} rows"
                )));
            }
            PutOutcome::Updated
        };

        tx.commit()?;
        debug!("event=record_put module=repo status=ok account_id={owner} outcome={outcome:?}");
        Ok(outcome)
    }

    fn get(&self, owner: AccountId, name: &str) -> StoreResult<String> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM records WHERE account_id = ?1 AND name = ?2;",
                params![owner.0, name],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        value.ok_or_else(|| StoreError::NotFound(format!("record `{name}`")))
    }

    fn get_record(&self, owner: AccountId, name: &str) -> StoreResult<Option<Record>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, account_id, name, value, created_at, updated_at
                 FROM records
                 WHERE account_id = ?1 AND name = ?2;",
                params![owner.0, name],
                |row| {
                    Ok(Record {
                        id: row.get("id")?,
                        owner: AccountId(row.get("account_id")?),
                        name: row.get("name")?,
                        value: row.get("value")?,
                        created_at: row.get("created_at")?,
                        updated_at: row.get("updated_at")?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn delete(&mut self, owner: AccountId, name: &str) -> StoreResult<bool> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute(
            "DELETE FROM records WHERE account_id = ?1 AND name = ?2;",
            params![owner.0, name],
        )?;
        tx.commit()?;

        debug!(
            "event=record_delete module=repo status=ok account_id={owner} removed={}",
            removed > 0
        );
        Ok(removed > 0)
    }

    fn list_names(&self, owner: AccountId) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM records WHERE account_id = ?1 ORDER BY name ASC;")?;
        let mut rows = stmt.query([owner.0])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(row.get::<_, String>(0)?);
        }
        Ok(names)
    }
}

fn map_owner_error(err: rusqlite::Error, owner: AccountId) -> StoreError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
            return StoreError::NotFound(format!("account {owner}"));
        }
    }
    err.into()
}
