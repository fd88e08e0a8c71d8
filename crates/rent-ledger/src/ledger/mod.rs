//! Tenant registry and rent payment rules.
//!
//! Payments pass through [`validation`] before the service touches storage; the router
//! only translates service errors into status codes.

pub mod domain;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    Payment, PaymentDateInput, PaymentSubmission, Tenant, TenantRegistration, RENT_AMOUNT,
};
pub use router::{ledger_router, status_for};
pub use service::{LedgerServiceError, RentLedgerService, TENANT_REGISTERED};
pub use validation::{validate_payment, PaymentOutcome, PaymentViolation};
