//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

/// Cover type slug (string identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CoverType {
    Hardcover,
    Soft,
}

impl CoverType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverType::Hardcover => "hardcover",
            CoverType::Soft => "soft",
        }
    }
}

impl std::fmt::Display for CoverType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CoverType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hardcover" => Ok(CoverType::Hardcover),
            "soft" => Ok(CoverType::Soft),
            _ => Err(format!("Invalid cover type: {}", s)),
        }
    }
}

// SQLx conversion for CoverType (stored as text)
impl sqlx::Type<Postgres> for CoverType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for CoverType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for CoverType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub cover: CoverType,
    /// Copies currently on the shelf; never negative
    pub inventory: i32,
    /// Charge per borrowed day
    pub daily_fee: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    pub cover: CoverType,
    #[validate(range(min = 0, message = "Inventory must not be negative"))]
    pub inventory: i32,
    pub daily_fee: Decimal,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover: Option<CoverType>,
    #[validate(range(min = 0, message = "Inventory must not be negative"))]
    pub inventory: Option<i32>,
    pub daily_fee: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn cover_type_parses_case_insensitively() {
        assert_eq!(CoverType::from_str("HARDCOVER").unwrap(), CoverType::Hardcover);
        assert_eq!(CoverType::from_str("soft").unwrap(), CoverType::Soft);
    }

    #[test]
    fn cover_type_rejects_unknown_values() {
        assert!(CoverType::from_str("paperback").is_err());
    }

    #[test]
    fn create_book_rejects_negative_inventory() {
        let book = CreateBook {
            title: "Title".to_string(),
            author: "Author".to_string(),
            cover: CoverType::Soft,
            inventory: -1,
            daily_fee: Decimal::new(999, 2),
        };
        assert!(book.validate().is_err());
    }
}
