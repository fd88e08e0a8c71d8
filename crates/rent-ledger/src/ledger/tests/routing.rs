use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::ledger::{
    ledger_router, status_for, LedgerServiceError, PaymentViolation, RentLedgerService,
};
use crate::storage::StoreError;

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

#[test]
fn status_codes_follow_error_kind() {
    let cases = [
        (
            LedgerServiceError::Validation(PaymentViolation::NonNumericTenantId),
            StatusCode::BAD_REQUEST,
        ),
        (
            LedgerServiceError::Validation(PaymentViolation::AmountOutOfRange(dec!(0))),
            StatusCode::BAD_REQUEST,
        ),
        (LedgerServiceError::IntegrityConflict, StatusCode::BAD_REQUEST),
        (
            LedgerServiceError::DuplicateEmail(TENANT_EMAIL.to_string()),
            StatusCode::BAD_REQUEST,
        ),
        (
            LedgerServiceError::TenantNotFound(TENANT_ID.to_string()),
            StatusCode::NOT_FOUND,
        ),
        (LedgerServiceError::NoPaymentsRegistered, StatusCode::NOT_FOUND),
        (
            LedgerServiceError::Store(StoreError::Unavailable("down".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (error, expected) in cases {
        assert_eq!(status_for(&error), expected, "{error}");
    }
}

#[tokio::test]
async fn full_payment_returns_acknowledgement_string() {
    let router = seeded_router().await;

    let response = router
        .oneshot(post_json(
            "/api/payments",
            json!({
                "tenant_id_number": TENANT_ID,
                "property_code": "AB1234",
                "paid_amount": 1000000,
                "payment_date": "2024-10-11"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload, json!("Thank you for paying your full rent."));
}

#[tokio::test]
async fn even_day_payment_is_bad_request() {
    let router = seeded_router().await;

    let response = router
        .oneshot(post_json(
            "/api/payments",
            json!({
                "tenant_id_number": TENANT_ID,
                "property_code": "A1",
                "paid_amount": 500000,
                "payment_date": "2024-10-10"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("odd days"));
}

#[tokio::test]
async fn malformed_date_text_is_bad_request() {
    let router = seeded_router().await;

    let response = router
        .oneshot(post_json(
            "/api/payments",
            json!({
                "tenant_id_number": TENANT_ID,
                "property_code": "A1",
                "paid_amount": 500000,
                "payment_date": "11/10/2024"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn whitespace_padded_date_is_bad_request() {
    let router = seeded_router().await;

    let response = router
        .oneshot(post_json(
            "/api/payments",
            json!({
                "tenant_id_number": TENANT_ID,
                "property_code": "A1",
                "paid_amount": 500000,
                "payment_date": " 2024-10-11"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("invalid date format"));
}

#[tokio::test]
async fn unknown_tenant_is_not_found() {
    let router = ledger_router(Arc::new(build_service().0));

    let response = router
        .oneshot(post_json(
            "/api/payments",
            json!({
                "tenant_id_number": "999",
                "property_code": "A1",
                "paid_amount": 500000,
                "payment_date": "2024-10-11"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn over_precise_amount_is_rejected_before_validation() {
    let router = seeded_router().await;

    let response = router
        .oneshot(post_json(
            "/api/payments",
            json!({
                "tenant_id_number": TENANT_ID,
                "property_code": "A1",
                "paid_amount": "10.005",
                "payment_date": "2024-10-11"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn empty_payment_listing_is_not_found() {
    let router = ledger_router(Arc::new(build_service().0));

    let response = router
        .oneshot(get("/api/payments"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn payments_list_after_registration() {
    let service = Arc::new(seeded_service().await);
    service
        .register_payment(submission("A1", dec!(500000)))
        .await
        .expect("payment accepted");

    let response = ledger_router(service)
        .oneshot(get("/api/payments"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let payments = payload.as_array().expect("array payload");
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["property_code"], json!("A1"));
    assert_eq!(payments[0]["tenant_id_number"], json!(TENANT_ID));
    assert_eq!(payments[0]["payment_date"], json!("2024-10-11"));
}

#[tokio::test]
async fn tenant_routes_register_and_list() {
    let router = ledger_router(Arc::new(build_service().0));

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/tenants",
            json!({
                "tenant_id_number": "121234",
                "full_name": "John Doe",
                "email": "abcde@example.com",
                "phone": "123456789"
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json_body(response).await,
        json!("Tenant registered successfully.")
    );

    let response = router
        .oneshot(get("/api/tenants"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
    assert_eq!(payload[0]["email"], json!("abcde@example.com"));
}

#[tokio::test]
async fn duplicate_tenant_email_is_bad_request() {
    let router = seeded_router().await;

    let response = router
        .oneshot(post_json(
            "/api/tenants",
            json!({
                "tenant_id_number": "654321",
                "full_name": "John Doe",
                "email": TENANT_EMAIL,
                "phone": "123456789"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("already exists"));
}

#[tokio::test]
async fn junk_tenant_email_is_unprocessable() {
    for email in ["<x>@exa_mple.com", "a\"b@ex!ample.c%m", "john@-.-"] {
        let router = ledger_router(Arc::new(build_service().0));

        let response = router
            .oneshot(post_json(
                "/api/tenants",
                json!({
                    "tenant_id_number": "654321",
                    "full_name": "John Doe",
                    "email": email,
                    "phone": "123456789"
                }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{email}");
    }
}

#[tokio::test]
async fn empty_tenant_listing_is_ok() {
    let router = ledger_router(Arc::new(build_service().0));

    let response = router
        .oneshot(get("/api/tenants"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await, json!([]));
}

#[tokio::test]
async fn store_outage_is_internal_error() {
    let router = ledger_router(Arc::new(RentLedgerService::new(Arc::new(UnavailableStore))));

    let response = router
        .oneshot(get("/api/tenants"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
