//! # cc-account-state
//!
//! Account State subsystem for Corechain.
//!
//! ## Role in System
//!
//! - **Single Source of Truth**: authoritative record of every account, its
//!   balances and its authority configuration
//! - **Reverse-Lookup Indices**: key/account/address membership and referral
//!   maps, kept exactly consistent with every entity mutation
//! - **Fee Settlement**: exact integer redistribution of accumulated fees
//!   across the referral chain on each maintenance cycle
//!
//! ## Mutation Flow
//!
//! ```text
//! [Operation Validation] ──create/update──→ [AccountStateService]
//!                                                 │
//!                                    validate, then commit
//!                                                 │
//!                        ┌────────────────────────┼────────────────────────┐
//!                        ↓                        ↓                        ↓
//!                 [Account Entities]      [Member Index]          [Referrer Index]
//!                                         (before/after diff)     (before/after diff)
//! ```
//!
//! A rejected mutation reaches neither the entities nor the indices; a
//! committed one updates both in the same synchronous step. The maintenance
//! driver calls [`AccountStateService::process_maintenance`] once per account
//! per cycle, which pays accumulated fees out through the
//! [`CashbackSink`](ports::cashback::CashbackSink) port.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::*;
pub use application::*;
pub use config::*;
pub use domain::*;
pub use ports::*;
