use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::ledger::domain::{PaymentDateInput, PaymentSubmission, TenantRegistration};
use crate::ledger::{ledger_router, RentLedgerService};
use crate::storage::{InMemoryLedgerStore, LedgerStore, StoreError};

pub(super) const TENANT_ID: &str = "123456";
pub(super) const TENANT_EMAIL: &str = "johndoe@example.com";

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn registration() -> TenantRegistration {
    TenantRegistration {
        tenant_id_number: TENANT_ID.to_string(),
        full_name: "John Doe".to_string(),
        email: TENANT_EMAIL.to_string(),
        phone: "123456789".to_string(),
    }
}

pub(super) fn submission(property_code: &str, paid_amount: Decimal) -> PaymentSubmission {
    PaymentSubmission {
        tenant_id_number: TENANT_ID.to_string(),
        property_code: property_code.to_string(),
        paid_amount,
        payment_date: PaymentDateInput::from("2024-10-11"),
    }
}

pub(super) fn build_service() -> (
    RentLedgerService<InMemoryLedgerStore>,
    Arc<InMemoryLedgerStore>,
) {
    let store = Arc::new(InMemoryLedgerStore::default());
    let service = RentLedgerService::new(store.clone());
    (service, store)
}

/// Service whose store already holds the default tenant.
pub(super) async fn seeded_service() -> RentLedgerService<InMemoryLedgerStore> {
    let (service, _) = build_service();
    service
        .register_tenant(registration())
        .await
        .expect("seed tenant");
    service
}

pub(super) async fn seeded_router() -> axum::Router {
    ledger_router(Arc::new(seeded_service().await))
}

/// Store whose backend is down for every request.
pub(super) struct UnavailableStore;

#[async_trait]
impl LedgerStore for UnavailableStore {
    type Session = <InMemoryLedgerStore as LedgerStore>::Session;

    async fn acquire(&self) -> Result<Self::Session, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn backend(&self) -> &'static str {
        "unavailable"
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
