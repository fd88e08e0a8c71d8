use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::domain::{Payment, PaymentDateInput, PaymentSubmission, RENT_AMOUNT};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Business-rule failures raised before a payment touches storage.
///
/// Variants are listed in the order the pipeline checks them; the first failing rule wins.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentViolation {
    #[error("invalid date format '{0}', use yyyy-mm-dd")]
    InvalidDateFormat(String),
    #[error("unrecognized payment date value")]
    UnrecognizedDateType,
    #[error("payments are only accepted on odd days of the month ({0} falls on an even day)")]
    EvenPaymentDay(NaiveDate),
    #[error("tenant identification number must be numeric")]
    NonNumericTenantId,
    #[error("property code must be alphanumeric")]
    NonAlphanumericPropertyCode,
    #[error("paid amount must be between 1 and 1,000,000 (received {0})")]
    AmountOutOfRange(Decimal),
}

/// Accepts text only when it is exactly the `yyyy-mm-dd` rendering of a calendar date.
pub fn parse_payment_date(input: &PaymentDateInput) -> Result<NaiveDate, PaymentViolation> {
    match input {
        PaymentDateInput::Date(date) => Ok(*date),
        PaymentDateInput::Text(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .ok()
            .filter(|date| date.format(DATE_FORMAT).to_string() == *raw)
            .ok_or_else(|| PaymentViolation::InvalidDateFormat(raw.clone())),
        PaymentDateInput::Other(_) => Err(PaymentViolation::UnrecognizedDateType),
    }
}

pub fn ensure_odd_day(date: NaiveDate) -> Result<(), PaymentViolation> {
    if date.day() % 2 == 0 {
        return Err(PaymentViolation::EvenPaymentDay(date));
    }
    Ok(())
}

pub fn ensure_numeric_tenant_id(tenant_id_number: &str) -> Result<(), PaymentViolation> {
    if tenant_id_number.is_empty() || !tenant_id_number.chars().all(|c| c.is_ascii_digit()) {
        return Err(PaymentViolation::NonNumericTenantId);
    }
    Ok(())
}

pub fn ensure_alphanumeric_property_code(property_code: &str) -> Result<(), PaymentViolation> {
    if property_code.is_empty() || !property_code.chars().all(char::is_alphanumeric) {
        return Err(PaymentViolation::NonAlphanumericPropertyCode);
    }
    Ok(())
}

pub fn ensure_amount_in_range(amount: Decimal) -> Result<(), PaymentViolation> {
    if amount < Decimal::ONE || amount > RENT_AMOUNT {
        return Err(PaymentViolation::AmountOutOfRange(amount));
    }
    Ok(())
}

/// Run every field rule in order and produce the row to persist.
pub fn validate_payment(submission: PaymentSubmission) -> Result<Payment, PaymentViolation> {
    let payment_date = parse_payment_date(&submission.payment_date)?;
    ensure_odd_day(payment_date)?;
    ensure_numeric_tenant_id(&submission.tenant_id_number)?;
    ensure_alphanumeric_property_code(&submission.property_code)?;
    ensure_amount_in_range(submission.paid_amount)?;

    Ok(Payment {
        tenant_id_number: submission.tenant_id_number,
        property_code: submission.property_code,
        paid_amount: submission.paid_amount,
        payment_date,
    })
}

/// What a stored payment means for the month's rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    FullRent,
    Partial { remaining: Decimal },
}

impl PaymentOutcome {
    pub fn for_amount(paid_amount: Decimal) -> Self {
        if paid_amount == RENT_AMOUNT {
            Self::FullRent
        } else {
            Self::Partial {
                remaining: RENT_AMOUNT - paid_amount,
            }
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PaymentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentOutcome::FullRent => write!(f, "Thank you for paying your full rent."),
            PaymentOutcome::Partial { remaining } => write!(
                f,
                "Thank you for your partial payment. However, you still owe ${:.2}.",
                remaining
            ),
        }
    }
}
