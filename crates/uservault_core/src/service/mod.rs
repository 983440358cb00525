//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate credential checks and record store calls into request-level
//!   APIs.
//! - Keep transport layers decoupled from storage details.

pub mod data_service;
pub mod error;
