//! Payment model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

use crate::error::AppError;

/// Payment status slug (string identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

/// Payment type slug: a regular fee or an overdue fine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Payment,
    Fine,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Payment => "payment",
            PaymentType::Fine => "fine",
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "payment" => Ok(PaymentType::Payment),
            "fine" => Ok(PaymentType::Fine),
            _ => Err(AppError::InvalidPaymentType(format!(
                "Payment type has to be either payment or fine, got '{}'",
                s
            ))),
        }
    }
}

// SQLx conversions (both enums stored as text)
impl sqlx::Type<Postgres> for PaymentStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for PaymentStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for PaymentStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

impl sqlx::Type<Postgres> for PaymentType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for PaymentType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse::<PaymentType>()
            .map_err(|e| e.to_string().into())
    }
}

impl Encode<'_, Postgres> for PaymentType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Payment model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Payment {
    pub id: i32,
    pub status: PaymentStatus,
    pub payment_type: PaymentType,
    pub borrowing_id: i32,
    /// Amount owed, computed once at return time
    pub amount: Decimal,
    /// Checkout session identifier, null until a session exists
    pub session_id: Option<String>,
    pub session_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn payment_type_parses_known_values() {
        assert_eq!(PaymentType::from_str("payment").unwrap(), PaymentType::Payment);
        assert_eq!(PaymentType::from_str("FINE").unwrap(), PaymentType::Fine);
    }

    #[test]
    fn payment_type_rejects_unknown_values() {
        let err = PaymentType::from_str("refund").unwrap_err();
        assert!(matches!(err, AppError::InvalidPaymentType(_)));
    }

    #[test]
    fn payment_status_round_trips_through_strings() {
        for status in [PaymentStatus::Pending, PaymentStatus::Paid] {
            assert_eq!(PaymentStatus::from_str(status.as_str()).unwrap(), status);
        }
    }
}
