//! Domain layer for the Gift Ledger backend.
//!
//! This crate contains:
//! - Domain models (GiftRecord, GiftStatistics)
//! - The aggregation engine keeping per-ledger statistics consistent
//!   with the underlying gift records

pub mod models;
pub mod services;
