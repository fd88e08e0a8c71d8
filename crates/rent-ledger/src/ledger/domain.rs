use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use validator::ValidateEmail;

/// Full monthly rent. Acts as both the payment ceiling and the full-payment threshold.
pub const RENT_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Column limits for `payments.paid_amount` (NUMERIC(10, 2)).
pub const AMOUNT_MAX_DIGITS: u32 = 10;
pub const AMOUNT_MAX_DECIMAL_PLACES: u32 = 2;

/// Registered renter, keyed by a numeric identity document number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub tenant_id_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// Stored rent payment, keyed by the property it settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub tenant_id_number: String,
    pub property_code: String,
    pub paid_amount: Decimal,
    pub payment_date: NaiveDate,
}

/// Inbound payment attempt. Only the amount's precision is checked while decoding; every
/// business rule runs in the validation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSubmission {
    pub tenant_id_number: String,
    pub property_code: String,
    #[serde(deserialize_with = "deserialize_paid_amount")]
    pub paid_amount: Decimal,
    pub payment_date: PaymentDateInput,
}

/// Payment date as it arrived on the wire.
///
/// JSON strings always decode into [`PaymentDateInput::Text`] so the pipeline owns the
/// strict `yyyy-mm-dd` check. Non-string values land in [`PaymentDateInput::Other`].
/// [`PaymentDateInput::Date`] is only built in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentDateInput {
    #[serde(skip_deserializing)]
    Date(NaiveDate),
    Text(String),
    Other(serde_json::Value),
}

impl From<NaiveDate> for PaymentDateInput {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<&str> for PaymentDateInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Inbound tenant registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRegistration {
    pub tenant_id_number: String,
    pub full_name: String,
    #[serde(deserialize_with = "deserialize_email")]
    pub email: String,
    pub phone: String,
}

impl From<TenantRegistration> for Tenant {
    fn from(value: TenantRegistration) -> Self {
        Self {
            tenant_id_number: value.tenant_id_number,
            full_name: value.full_name,
            email: value.email,
            phone: value.phone,
        }
    }
}

/// Returns true when `amount` fits NUMERIC(10, 2) once trailing zeros are dropped.
pub fn fits_amount_column(amount: Decimal) -> bool {
    let normalized = amount.normalize();
    let scale = normalized.scale();
    let mantissa_digits = normalized.mantissa().unsigned_abs().to_string().len() as u32;
    scale <= AMOUNT_MAX_DECIMAL_PLACES && mantissa_digits.max(scale) <= AMOUNT_MAX_DIGITS
}

/// Valid address whose domain has at least one dot, so `user@localhost` is refused.
pub fn is_email_shaped(value: &str) -> bool {
    value.validate_email()
        && value
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.contains('.'))
}

fn deserialize_paid_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
    if fits_amount_column(amount) {
        Ok(amount)
    } else {
        Err(serde::de::Error::custom(format!(
            "paid_amount {amount} exceeds {AMOUNT_MAX_DIGITS} digits or \
             {AMOUNT_MAX_DECIMAL_PLACES} decimal places"
        )))
    }
}

fn deserialize_email<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if is_email_shaped(&raw) {
        Ok(raw)
    } else {
        Err(serde::de::Error::custom(format!(
            "'{raw}' is not a valid email address"
        )))
    }
}
