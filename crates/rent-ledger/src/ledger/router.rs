use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::domain::{PaymentSubmission, TenantRegistration};
use super::service::{LedgerServiceError, RentLedgerService};
use crate::storage::LedgerStore;

/// Router builder exposing the payment and tenant collections.
pub fn ledger_router<S>(service: Arc<RentLedgerService<S>>) -> Router
where
    S: LedgerStore + 'static,
{
    Router::new()
        .route(
            "/api/payments",
            get(list_payments_handler::<S>).post(register_payment_handler::<S>),
        )
        .route(
            "/api/tenants",
            get(list_tenants_handler::<S>).post(register_tenant_handler::<S>),
        )
        .with_state(service)
}

/// HTTP status for each failure kind: rule violations are 400, missing data is 404.
pub fn status_for(error: &LedgerServiceError) -> StatusCode {
    match error {
        LedgerServiceError::Validation(_)
        | LedgerServiceError::DuplicatePayment { .. }
        | LedgerServiceError::IntegrityConflict
        | LedgerServiceError::DuplicateEmail(_) => StatusCode::BAD_REQUEST,
        LedgerServiceError::TenantNotFound(_) | LedgerServiceError::NoPaymentsRegistered => {
            StatusCode::NOT_FOUND
        }
        LedgerServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: LedgerServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (status_for(&error), axum::Json(payload)).into_response()
}

pub(crate) async fn register_payment_handler<S>(
    State(service): State<Arc<RentLedgerService<S>>>,
    axum::Json(submission): axum::Json<PaymentSubmission>,
) -> Response
where
    S: LedgerStore + 'static,
{
    match service.register_payment(submission).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome.message())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_payments_handler<S>(
    State(service): State<Arc<RentLedgerService<S>>>,
) -> Response
where
    S: LedgerStore + 'static,
{
    match service.list_payments().await {
        Ok(payments) => (StatusCode::OK, axum::Json(payments)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_tenant_handler<S>(
    State(service): State<Arc<RentLedgerService<S>>>,
    axum::Json(registration): axum::Json<TenantRegistration>,
) -> Response
where
    S: LedgerStore + 'static,
{
    match service.register_tenant(registration).await {
        Ok(message) => (StatusCode::OK, axum::Json(message)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_tenants_handler<S>(
    State(service): State<Arc<RentLedgerService<S>>>,
) -> Response
where
    S: LedgerStore + 'static,
{
    match service.list_tenants().await {
        Ok(tenants) => (StatusCode::OK, axum::Json(tenants)).into_response(),
        Err(error) => error_response(error),
    }
}
