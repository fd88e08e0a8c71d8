use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{LedgerSession, LedgerStore, StoreError};
use crate::ledger::domain::{Payment, Tenant};

/// Process-local tables enforcing the same keys as the relational schema.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedgerStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    tenants: BTreeMap<String, Tenant>,
    payments: BTreeMap<String, Payment>,
}

#[derive(Debug)]
enum StagedRow {
    Tenant(Tenant),
    Payment(Payment),
}

#[derive(Debug)]
enum RowKey {
    Tenant(String),
    Payment(String),
}

impl Tables {
    fn apply(&mut self, row: StagedRow) -> Result<RowKey, StoreError> {
        match row {
            StagedRow::Tenant(tenant) => {
                if self.tenants.contains_key(&tenant.tenant_id_number)
                    || self.tenants.values().any(|other| other.email == tenant.email)
                {
                    return Err(StoreError::Conflict);
                }
                let key = tenant.tenant_id_number.clone();
                self.tenants.insert(key.clone(), tenant);
                Ok(RowKey::Tenant(key))
            }
            StagedRow::Payment(payment) => {
                if self.payments.contains_key(&payment.property_code)
                    || !self.tenants.contains_key(&payment.tenant_id_number)
                {
                    return Err(StoreError::Conflict);
                }
                let key = payment.property_code.clone();
                self.payments.insert(key.clone(), payment);
                Ok(RowKey::Payment(key))
            }
        }
    }

    fn revert(&mut self, key: RowKey) {
        match key {
            RowKey::Tenant(id) => {
                self.tenants.remove(&id);
            }
            RowKey::Payment(code) => {
                self.payments.remove(&code);
            }
        }
    }
}

fn lock(tables: &Mutex<Tables>) -> Result<MutexGuard<'_, Tables>, StoreError> {
    tables
        .lock()
        .map_err(|_| StoreError::Unavailable("ledger tables poisoned".to_string()))
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    type Session = InMemorySession;

    async fn acquire(&self) -> Result<Self::Session, StoreError> {
        Ok(InMemorySession {
            tables: Arc::clone(&self.tables),
            staged: Vec::new(),
        })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Session staging writes until commit.
#[derive(Debug)]
pub struct InMemorySession {
    tables: Arc<Mutex<Tables>>,
    staged: Vec<StagedRow>,
}

#[async_trait]
impl LedgerSession for InMemorySession {
    async fn find_tenant(&mut self, tenant_id_number: &str) -> Result<Option<Tenant>, StoreError> {
        let tables = lock(&self.tables)?;
        Ok(tables.tenants.get(tenant_id_number).cloned())
    }

    async fn find_tenant_by_email(&mut self, email: &str) -> Result<Option<Tenant>, StoreError> {
        let tables = lock(&self.tables)?;
        Ok(tables
            .tenants
            .values()
            .find(|tenant| tenant.email == email)
            .cloned())
    }

    async fn find_payment(
        &mut self,
        property_code: &str,
        payment_date: NaiveDate,
    ) -> Result<Option<Payment>, StoreError> {
        let tables = lock(&self.tables)?;
        Ok(tables
            .payments
            .get(property_code)
            .filter(|payment| payment.payment_date == payment_date)
            .cloned())
    }

    async fn list_payments(&mut self) -> Result<Vec<Payment>, StoreError> {
        let tables = lock(&self.tables)?;
        Ok(tables.payments.values().cloned().collect())
    }

    async fn list_tenants(&mut self) -> Result<Vec<Tenant>, StoreError> {
        let tables = lock(&self.tables)?;
        Ok(tables.tenants.values().cloned().collect())
    }

    async fn insert_payment(&mut self, payment: Payment) -> Result<(), StoreError> {
        self.staged.push(StagedRow::Payment(payment));
        Ok(())
    }

    async fn insert_tenant(&mut self, tenant: Tenant) -> Result<(), StoreError> {
        self.staged.push(StagedRow::Tenant(tenant));
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        let mut tables = lock(&self.tables)?;
        let mut applied = Vec::with_capacity(self.staged.len());
        for row in self.staged {
            match tables.apply(row) {
                Ok(key) => applied.push(key),
                Err(err) => {
                    for key in applied.into_iter().rev() {
                        tables.revert(key);
                    }
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}
