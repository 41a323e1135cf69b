//! # Corechain Test Suite
//!
//! Cross-crate integration tests for the account state store: whole-store
//! flows, index-consistency audits and storage-format round-trips.

pub mod integration;
