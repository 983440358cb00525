//! Domain model for accounts and their named records.
//!
//! # Responsibility
//! - Define the canonical data structures used by stores and services.
//! - Validate caller input before it reaches storage.
//!
//! # Invariants
//! - Every account is identified by a stable `AccountId`.
//! - A record's owner is fixed at creation and never reassigned.

pub mod account;
pub mod record;
pub mod validation;
