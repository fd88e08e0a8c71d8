//! Tenant registry and rent payment ledger.
//!
//! The [`ledger`] module owns the business rules and HTTP routes, while [`storage`]
//! exposes the row-level capability the ledger runs against.

pub mod config;
pub mod error;
pub mod ledger;
pub mod storage;
pub mod telemetry;
