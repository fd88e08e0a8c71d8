//! Row-level storage capability the ledger runs against.
//!
//! A [`LedgerStore`] hands out one [`LedgerSession`] per request. Writes made through a
//! session only become visible after [`LedgerSession::commit`]; dropping the session without
//! committing discards them.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::ledger::domain::{Payment, Tenant};

pub use memory::InMemoryLedgerStore;
pub use postgres::PgLedgerStore;

/// Source of request-scoped sessions.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    type Session: LedgerSession;

    async fn acquire(&self) -> Result<Self::Session, StoreError>;

    /// Short label for startup logs.
    fn backend(&self) -> &'static str;
}

/// Find, insert and commit against the `tenants` and `payments` tables.
#[async_trait]
pub trait LedgerSession: Send {
    async fn find_tenant(&mut self, tenant_id_number: &str) -> Result<Option<Tenant>, StoreError>;

    async fn find_tenant_by_email(&mut self, email: &str) -> Result<Option<Tenant>, StoreError>;

    async fn find_payment(
        &mut self,
        property_code: &str,
        payment_date: NaiveDate,
    ) -> Result<Option<Payment>, StoreError>;

    /// All payments ordered by property code.
    async fn list_payments(&mut self) -> Result<Vec<Payment>, StoreError>;

    /// All tenants ordered by identification number.
    async fn list_tenants(&mut self) -> Result<Vec<Tenant>, StoreError>;

    async fn insert_payment(&mut self, payment: Payment) -> Result<(), StoreError>;

    async fn insert_tenant(&mut self, tenant: Tenant) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A primary key, unique or foreign key constraint rejected the write.
    #[error("write rejected by a storage constraint")]
    Conflict,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
