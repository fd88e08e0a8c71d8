use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use rent_ledger::error::AppError;
use rent_ledger::ledger::{ledger_router, RentLedgerService};
use rent_ledger::storage::LedgerStore;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) fn with_ledger_routes<S>(service: Arc<RentLedgerService<S>>) -> Router
where
    S: LedgerStore + 'static,
{
    let probes = Router::new()
        .route("/ready", get(readiness_endpoint::<S>))
        .with_state(service.clone());

    ledger_router(service)
        .merge(probes)
        .route("/health", get(healthcheck))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Ready once the listener is bound and the store hands out sessions.
pub(crate) async fn readiness_endpoint<S>(
    Extension(state): Extension<AppState>,
    State(service): State<Arc<RentLedgerService<S>>>,
) -> Result<impl IntoResponse, AppError>
where
    S: LedgerStore + 'static,
{
    if !state.readiness.load(Ordering::Acquire) {
        return Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        ));
    }

    service.store().acquire().await?;
    Ok((StatusCode::OK, Json(json!({ "status": "ready" }))))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
