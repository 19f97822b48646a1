//! Borrowings repository for database operations
//!
//! Borrow and return both touch the book's inventory, so each runs as a
//! single transaction with the book row locked. That lock is the only
//! concurrency control: two concurrent borrows of the last copy serialize on
//! it and the second one fails.

use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrowing::{Borrowing, BorrowingDetails},
    },
};

#[derive(Clone)]
pub struct BorrowingsRepository {
    pool: Pool<Postgres>,
}

impl BorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrowing by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Borrowing> {
        sqlx::query_as::<_, Borrowing>("SELECT * FROM borrowings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))
    }

    /// Get borrowing with book and borrower details
    pub async fn get_details(&self, id: i32) -> AppResult<BorrowingDetails> {
        sqlx::query_as::<_, BorrowingDetails>(
            r#"
            SELECT bor.id, bor.user_id, bor.book_id,
                   bor.borrow_date, bor.expected_return_date, bor.actual_return_date,
                   b.title AS book_title, b.author AS book_author,
                   u.email AS user_email
            FROM borrowings bor
            JOIN books b ON bor.book_id = b.id
            JOIN users u ON bor.user_id = u.id
            WHERE bor.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))
    }

    /// List borrowings, optionally scoped to a user and/or active state
    pub async fn list(
        &self,
        user_id: Option<i32>,
        is_active: Option<bool>,
    ) -> AppResult<Vec<BorrowingDetails>> {
        let borrowings = sqlx::query_as::<_, BorrowingDetails>(
            r#"
            SELECT bor.id, bor.user_id, bor.book_id,
                   bor.borrow_date, bor.expected_return_date, bor.actual_return_date,
                   b.title AS book_title, b.author AS book_author,
                   u.email AS user_email
            FROM borrowings bor
            JOIN books b ON bor.book_id = b.id
            JOIN users u ON bor.user_id = u.id
            WHERE ($1::int IS NULL OR bor.user_id = $1)
              AND ($2::bool IS NULL
                   OR ($2 AND bor.actual_return_date IS NULL)
                   OR (NOT $2 AND bor.actual_return_date IS NOT NULL))
            ORDER BY bor.id
            "#,
        )
        .bind(user_id)
        .bind(is_active)
        .fetch_all(&self.pool)
        .await?;

        Ok(borrowings)
    }

    /// Create a new borrowing and take one copy off the shelf.
    ///
    /// The book row is locked for the duration of the transaction so the
    /// inventory check and the decrement cannot race; both the borrowing
    /// insert and the decrement commit together or not at all.
    pub async fn create(
        &self,
        user_id: i32,
        book_id: i32,
        expected_return_date: NaiveDate,
    ) -> AppResult<(Borrowing, Book)> {
        let today = Utc::now().date_naive();

        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if book.inventory <= 0 {
            return Err(AppError::OutOfStock("Book is out of stock".to_string()));
        }

        let book = sqlx::query_as::<_, Book>(
            "UPDATE books SET inventory = inventory - 1 WHERE id = $1 RETURNING *",
        )
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        let borrowing = sqlx::query_as::<_, Borrowing>(
            r#"
            INSERT INTO borrowings (user_id, book_id, borrow_date, expected_return_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(today)
        .bind(expected_return_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((borrowing, book))
    }

    /// Close a borrowing and put the copy back on the shelf.
    ///
    /// Sets the actual return date exactly once; a second call fails with
    /// `AlreadyReturned` before any mutation. The date update and the
    /// inventory increment commit together.
    pub async fn mark_returned(&self, id: i32) -> AppResult<(Borrowing, Book)> {
        let today = Utc::now().date_naive();

        let mut tx = self.pool.begin().await?;

        let borrowing =
            sqlx::query_as::<_, Borrowing>("SELECT * FROM borrowings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))?;

        if borrowing.actual_return_date.is_some() {
            return Err(AppError::AlreadyReturned(
                "Borrowing already returned".to_string(),
            ));
        }

        let borrowing = sqlx::query_as::<_, Borrowing>(
            "UPDATE borrowings SET actual_return_date = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

        let book = sqlx::query_as::<_, Book>(
            "UPDATE books SET inventory = inventory + 1 WHERE id = $1 RETURNING *",
        )
        .bind(borrowing.book_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((borrowing, book))
    }
}
