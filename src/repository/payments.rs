//! Payments repository for database operations

use rust_decimal::Decimal;
use sqlx::{FromRow, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::payment::{Payment, PaymentStatus, PaymentType},
};

/// Payment joined with the data needed for permission checks and sessions
#[derive(Debug, Clone, FromRow)]
pub struct PaymentContext {
    #[sqlx(flatten)]
    pub payment: Payment,
    pub owner_id: i32,
    pub book_title: String,
}

#[derive(Clone)]
pub struct PaymentsRepository {
    pool: Pool<Postgres>,
}

impl PaymentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get payment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Payment> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Payment with id {} not found", id)))
    }

    /// Get payment by ID along with its owner and book title
    pub async fn get_context(&self, id: i32) -> AppResult<PaymentContext> {
        sqlx::query_as::<_, PaymentContext>(
            r#"
            SELECT p.*, bor.user_id AS owner_id, b.title AS book_title
            FROM payments p
            JOIN borrowings bor ON p.borrowing_id = bor.id
            JOIN books b ON bor.book_id = b.id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Payment with id {} not found", id)))
    }

    /// List payments, optionally scoped to a borrower
    pub async fn list(&self, user_id: Option<i32>) -> AppResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT p.*
            FROM payments p
            JOIN borrowings bor ON p.borrowing_id = bor.id
            WHERE $1::int IS NULL OR bor.user_id = $1
            ORDER BY p.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Create a pending payment for a borrowing.
    ///
    /// At most one payment of a given type may exist per borrowing; the
    /// UNIQUE constraint backs the pre-check against concurrent inserts.
    pub async fn create(
        &self,
        borrowing_id: i32,
        payment_type: PaymentType,
        amount: Decimal,
        session_id: Option<&str>,
        session_url: Option<&str>,
    ) -> AppResult<Payment> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM payments WHERE borrowing_id = $1 AND payment_type = $2)",
        )
        .bind(borrowing_id)
        .bind(payment_type)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            return Err(AppError::DuplicatePayment(format!(
                "A payment of type '{}' already exists for borrowing {}",
                payment_type, borrowing_id
            )));
        }

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (status, payment_type, borrowing_id, amount, session_id, session_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(PaymentStatus::Pending)
        .bind(payment_type)
        .bind(borrowing_id)
        .bind(amount)
        .bind(session_id)
        .bind(session_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicatePayment(
                format!(
                    "A payment of type '{}' already exists for borrowing {}",
                    payment_type, borrowing_id
                ),
            ),
            _ => AppError::Database(e),
        })?;

        Ok(payment)
    }

    /// Store a freshly created checkout session on a payment
    pub async fn set_session(
        &self,
        id: i32,
        session_id: &str,
        session_url: &str,
    ) -> AppResult<Payment> {
        sqlx::query_as::<_, Payment>(
            "UPDATE payments SET session_id = $2, session_url = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(session_id)
        .bind(session_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Payment with id {} not found", id)))
    }

    /// Mark the payment carrying this session as paid (idempotent)
    pub async fn mark_paid_by_session(&self, session_id: &str) -> AppResult<Payment> {
        sqlx::query_as::<_, Payment>(
            "UPDATE payments SET status = $2 WHERE session_id = $1 RETURNING *",
        )
        .bind(session_id)
        .bind(PaymentStatus::Paid)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No payment found for session {}", session_id))
        })
    }
}
