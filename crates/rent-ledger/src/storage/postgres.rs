use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::debug;

use super::{LedgerSession, LedgerStore, StoreError};
use crate::ledger::domain::{Payment, Tenant};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Idempotent DDL for the two ledger tables. Order matters: payments reference tenants.
pub const SCHEMA: [&str; 2] = [
    r#"CREATE TABLE IF NOT EXISTS tenants (
           tenant_id_number VARCHAR NOT NULL,
           full_name VARCHAR NOT NULL,
           email VARCHAR NOT NULL,
           phone VARCHAR NOT NULL,
           CONSTRAINT tenants_pkey PRIMARY KEY (tenant_id_number),
           CONSTRAINT tenants_email_key UNIQUE (email)
       )"#,
    r#"CREATE TABLE IF NOT EXISTS payments (
           property_code VARCHAR NOT NULL,
           tenant_id_number VARCHAR NOT NULL,
           paid_amount NUMERIC(10, 2) NOT NULL,
           payment_date DATE NOT NULL,
           CONSTRAINT pk_payments PRIMARY KEY (property_code),
           CONSTRAINT fk_tenant FOREIGN KEY (tenant_id_number)
               REFERENCES tenants (tenant_id_number)
       )"#,
];

/// PostgreSQL-backed store. Each session wraps one transaction.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(url)
            .await
            .map_err(map_sqlx_error)?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the ledger tables when they are missing.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        debug!("ledger schema applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Session = PgLedgerSession;

    async fn acquire(&self) -> Result<Self::Session, StoreError> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(PgLedgerSession { tx })
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// Open transaction; rolled back on drop unless committed.
pub struct PgLedgerSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerSession for PgLedgerSession {
    async fn find_tenant(&mut self, tenant_id_number: &str) -> Result<Option<Tenant>, StoreError> {
        let row = sqlx::query(
            "SELECT tenant_id_number, full_name, email, phone \
             FROM tenants WHERE tenant_id_number = $1",
        )
        .bind(tenant_id_number)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(tenant_from_row).transpose()
    }

    async fn find_tenant_by_email(&mut self, email: &str) -> Result<Option<Tenant>, StoreError> {
        let row = sqlx::query(
            "SELECT tenant_id_number, full_name, email, phone \
             FROM tenants WHERE email = $1 LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(tenant_from_row).transpose()
    }

    async fn find_payment(
        &mut self,
        property_code: &str,
        payment_date: NaiveDate,
    ) -> Result<Option<Payment>, StoreError> {
        let row = sqlx::query(
            "SELECT tenant_id_number, property_code, paid_amount, payment_date \
             FROM payments WHERE property_code = $1 AND payment_date = $2 LIMIT 1",
        )
        .bind(property_code)
        .bind(payment_date)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(payment_from_row).transpose()
    }

    async fn list_payments(&mut self) -> Result<Vec<Payment>, StoreError> {
        let rows = sqlx::query(
            "SELECT tenant_id_number, property_code, paid_amount, payment_date \
             FROM payments ORDER BY property_code",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(payment_from_row).collect()
    }

    async fn list_tenants(&mut self) -> Result<Vec<Tenant>, StoreError> {
        let rows = sqlx::query(
            "SELECT tenant_id_number, full_name, email, phone \
             FROM tenants ORDER BY tenant_id_number",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(tenant_from_row).collect()
    }

    async fn insert_payment(&mut self, payment: Payment) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO payments (property_code, tenant_id_number, paid_amount, payment_date) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(payment.property_code)
        .bind(payment.tenant_id_number)
        .bind(payment.paid_amount)
        .bind(payment.payment_date)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn insert_tenant(&mut self, tenant: Tenant) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO tenants (tenant_id_number, full_name, email, phone) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(tenant.tenant_id_number)
        .bind(tenant.full_name)
        .bind(tenant.email)
        .bind(tenant.phone)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }
}

fn tenant_from_row(row: &PgRow) -> Result<Tenant, StoreError> {
    Ok(Tenant {
        tenant_id_number: row.try_get("tenant_id_number").map_err(map_sqlx_error)?,
        full_name: row.try_get("full_name").map_err(map_sqlx_error)?,
        email: row.try_get("email").map_err(map_sqlx_error)?,
        phone: row.try_get("phone").map_err(map_sqlx_error)?,
    })
}

fn payment_from_row(row: &PgRow) -> Result<Payment, StoreError> {
    Ok(Payment {
        tenant_id_number: row.try_get("tenant_id_number").map_err(map_sqlx_error)?,
        property_code: row.try_get("property_code").map_err(map_sqlx_error)?,
        paid_amount: row.try_get("paid_amount").map_err(map_sqlx_error)?,
        payment_date: row.try_get("payment_date").map_err(map_sqlx_error)?,
    })
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() || db.is_foreign_key_violation() => {
            StoreError::Conflict
        }
        _ => StoreError::Unavailable(err.to_string()),
    }
}
