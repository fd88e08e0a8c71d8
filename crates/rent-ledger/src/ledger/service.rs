use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use super::domain::{Payment, PaymentSubmission, Tenant, TenantRegistration};
use super::validation::{validate_payment, PaymentOutcome, PaymentViolation};
use crate::storage::{LedgerSession, LedgerStore, StoreError};

pub const TENANT_REGISTERED: &str = "Tenant registered successfully.";

/// Service applying the payment rules and tenant registry on top of a store.
///
/// Every operation acquires its own session, so no state is shared between requests
/// beyond what the store itself persists.
pub struct RentLedgerService<S> {
    store: Arc<S>,
}

impl<S> RentLedgerService<S>
where
    S: LedgerStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Validate and persist one payment, describing how much rent it covers.
    pub async fn register_payment(
        &self,
        submission: PaymentSubmission,
    ) -> Result<PaymentOutcome, LedgerServiceError> {
        let payment = validate_payment(submission).inspect_err(|violation| {
            debug!(%violation, "payment rejected by validation");
        })?;

        let mut session = self.store.acquire().await?;

        if session.find_tenant(&payment.tenant_id_number).await?.is_none() {
            debug!(tenant = %payment.tenant_id_number, "payment references unknown tenant");
            return Err(LedgerServiceError::TenantNotFound(payment.tenant_id_number));
        }

        if session
            .find_payment(&payment.property_code, payment.payment_date)
            .await?
            .is_some()
        {
            debug!(
                property_code = %payment.property_code,
                payment_date = %payment.payment_date,
                "duplicate payment rejected"
            );
            return Err(LedgerServiceError::DuplicatePayment {
                property_code: payment.property_code,
                payment_date: payment.payment_date,
            });
        }

        let outcome = PaymentOutcome::for_amount(payment.paid_amount);
        let property_code = payment.property_code.clone();
        let tenant_id_number = payment.tenant_id_number.clone();

        session
            .insert_payment(payment)
            .await
            .map_err(|err| write_failure(err, "payment"))?;
        session
            .commit()
            .await
            .map_err(|err| write_failure(err, "payment"))?;

        info!(
            %property_code,
            tenant = %tenant_id_number,
            full = matches!(outcome, PaymentOutcome::FullRent),
            "payment registered"
        );
        Ok(outcome)
    }

    /// Every stored payment. An empty ledger is reported as an error.
    pub async fn list_payments(&self) -> Result<Vec<Payment>, LedgerServiceError> {
        let mut session = self.store.acquire().await?;
        let payments = session.list_payments().await?;
        if payments.is_empty() {
            return Err(LedgerServiceError::NoPaymentsRegistered);
        }
        Ok(payments)
    }

    /// Register a tenant whose email is not yet on file.
    pub async fn register_tenant(
        &self,
        registration: TenantRegistration,
    ) -> Result<&'static str, LedgerServiceError> {
        let mut session = self.store.acquire().await?;

        if session
            .find_tenant_by_email(&registration.email)
            .await?
            .is_some()
        {
            debug!(email = %registration.email, "duplicate tenant email rejected");
            return Err(LedgerServiceError::DuplicateEmail(registration.email));
        }

        let tenant = Tenant::from(registration);
        let tenant_id_number = tenant.tenant_id_number.clone();

        session
            .insert_tenant(tenant)
            .await
            .map_err(|err| write_failure(err, "tenant"))?;
        session
            .commit()
            .await
            .map_err(|err| write_failure(err, "tenant"))?;

        info!(tenant = %tenant_id_number, "tenant registered");
        Ok(TENANT_REGISTERED)
    }

    /// Every registered tenant; an empty registry yields an empty list.
    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, LedgerServiceError> {
        let mut session = self.store.acquire().await?;
        Ok(session.list_tenants().await?)
    }
}

/// Constraint rejections on insert or commit become [`LedgerServiceError::IntegrityConflict`].
fn write_failure(err: StoreError, entity: &'static str) -> LedgerServiceError {
    match &err {
        StoreError::Conflict => warn!(entity, "insert rejected by storage constraint"),
        StoreError::Unavailable(reason) => error!(entity, %reason, "insert failed"),
    }
    LedgerServiceError::from(err)
}

/// Error raised by the ledger service.
#[derive(Debug, thiserror::Error)]
pub enum LedgerServiceError {
    #[error(transparent)]
    Validation(#[from] PaymentViolation),
    #[error("tenant {0} not found")]
    TenantNotFound(String),
    #[error("a payment is already registered for property {property_code} on {payment_date}")]
    DuplicatePayment {
        property_code: String,
        payment_date: NaiveDate,
    },
    #[error("integrity error: the record conflicts with existing data")]
    IntegrityConflict,
    #[error("a tenant with email {0} already exists")]
    DuplicateEmail(String),
    #[error("no payments registered yet")]
    NoPaymentsRegistered,
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for LedgerServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict => Self::IntegrityConflict,
            other => Self::Store(other),
        }
    }
}
