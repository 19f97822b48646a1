//! Borrowing (loan) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Borrowing model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrowing {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    /// Set at creation, immutable afterwards
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    /// Null while the borrowing is active; set exactly once at return
    pub actual_return_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Borrowing {
    /// A borrowing is active until the book comes back
    pub fn is_active(&self) -> bool {
        self.actual_return_date.is_none()
    }
}

/// Borrowing with book and borrower details for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowingDetails {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub book_title: String,
    pub book_author: String,
    pub user_email: String,
}

/// Create borrowing request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBorrowing {
    pub book_id: i32,
    pub expected_return_date: NaiveDate,
}

/// Borrowing list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BorrowingQuery {
    /// Filter by borrower (admin only; ignored for regular users)
    pub user_id: Option<i32>,
    /// true: only active borrowings; false: only returned ones
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrowing_is_active_until_returned() {
        let mut borrowing = Borrowing {
            id: 1,
            user_id: 1,
            book_id: 1,
            borrow_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            expected_return_date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            actual_return_date: None,
            created_at: Utc::now(),
        };
        assert!(borrowing.is_active());

        borrowing.actual_return_date = NaiveDate::from_ymd_opt(2024, 3, 7);
        assert!(!borrowing.is_active());
    }
}
