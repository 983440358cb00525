//! Record domain model.
//!
//! # Invariants
//! - At most one record exists per (`owner`, `name`).
//! - Rewriting a name replaces `value` in place; `id` is preserved.

use super::account::AccountId;
use serde::{Deserialize, Serialize};

/// Persisted named value owned by one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub owner: AccountId,
    pub name: String,
    pub value: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds; bumped on every in-place replacement.
    pub updated_at: i64,
}

/// Read view returned to callers of a point lookup.
///
/// Field names follow the wire shape `{"dataName": ..., "dataValue": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataEntry {
    pub data_name: String,
    pub data_value: String,
}

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PutOutcome {
    /// No record existed for the name; a new row was inserted.
    Created,
    /// An existing row had its value replaced.
    Updated,
}
