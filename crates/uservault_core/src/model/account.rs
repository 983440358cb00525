//! Account domain model.
//!
//! # Invariants
//! - `id` is system-assigned and never reused.
//! - `username` is unique, case-sensitive and immutable after creation.
//! - `password_hash` is opaque outside the `password` module.

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Stable, system-assigned account identifier (SQLite row id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl Display for AccountId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted account row.
///
/// Deliberately not `Serialize`: the hash must never leave the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub password_hash: String,
    /// Round count `password_hash` was derived with.
    pub hash_cost: u32,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}
