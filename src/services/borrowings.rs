//! Borrowing lifecycle service
//!
//! Owns the two non-trivial flows: taking a book off the shelf and bringing
//! it back. Inventory mutations stay inside repository transactions; the
//! notification and gateway collaborators are only touched after commit.

use std::sync::Arc;

use crate::{
    config::StripeConfig,
    error::{AppError, AppResult},
    models::{
        borrowing::{Borrowing, BorrowingDetails, BorrowingQuery, CreateBorrowing},
        payment::Payment,
        user::UserClaims,
    },
    repository::Repository,
    services::{billing, gateway::CheckoutGateway, notifier::Notifier},
};

/// Result of a successful return handed back to the caller
#[derive(Debug, Clone)]
pub struct ReturnOutcome {
    pub message: String,
    pub payment: Payment,
}

#[derive(Clone)]
pub struct BorrowingsService {
    repository: Repository,
    notifier: Notifier,
    gateway: Arc<dyn CheckoutGateway>,
    stripe: StripeConfig,
}

impl BorrowingsService {
    pub fn new(
        repository: Repository,
        notifier: Notifier,
        gateway: Arc<dyn CheckoutGateway>,
        stripe: StripeConfig,
    ) -> Self {
        Self {
            repository,
            notifier,
            gateway,
            stripe,
        }
    }

    /// List borrowings visible to the caller.
    ///
    /// Regular users only ever see their own records; the `user_id` filter
    /// is an admin facility and is ignored otherwise.
    pub async fn list(
        &self,
        claims: &UserClaims,
        query: &BorrowingQuery,
    ) -> AppResult<Vec<BorrowingDetails>> {
        let user_id = if claims.is_admin() {
            query.user_id
        } else {
            Some(claims.user_id)
        };

        self.repository.borrowings.list(user_id, query.is_active).await
    }

    /// Get one borrowing; non-admins cannot see other users' records
    pub async fn get(&self, claims: &UserClaims, id: i32) -> AppResult<BorrowingDetails> {
        let details = self.repository.borrowings.get_details(id).await?;

        if !claims.is_admin() && details.user_id != claims.user_id {
            return Err(AppError::NotFound(format!(
                "Borrowing with id {} not found",
                id
            )));
        }

        Ok(details)
    }

    /// Borrow a book for the acting user
    pub async fn borrow(
        &self,
        claims: &UserClaims,
        request: CreateBorrowing,
    ) -> AppResult<Borrowing> {
        let (borrowing, book) = self
            .repository
            .borrowings
            .create(claims.user_id, request.book_id, request.expected_return_date)
            .await?;

        self.notifier
            .notify(borrow_message(&book.title, &claims.sub));

        Ok(borrowing)
    }

    /// Return a borrowed book.
    ///
    /// Closes the borrowing, computes the charge, records a pending payment
    /// and opens a checkout session for it. The return itself stays
    /// committed even if the gateway call afterwards fails.
    pub async fn return_book(&self, claims: &UserClaims, id: i32) -> AppResult<ReturnOutcome> {
        let borrowing = self.repository.borrowings.get_by_id(id).await?;

        if borrowing.user_id != claims.user_id && !claims.is_admin() {
            return Err(AppError::Authorization(
                "It's not your borrowing".to_string(),
            ));
        }

        let (borrowing, book) = self.repository.borrowings.mark_returned(id).await?;

        // mark_returned just set this
        let actual_return_date = borrowing
            .actual_return_date
            .ok_or_else(|| AppError::Internal("Return date missing after return".to_string()))?;

        let charge = billing::charge_for_return(
            borrowing.borrow_date,
            borrowing.expected_return_date,
            actual_return_date,
            book.daily_fee,
        );

        let session = self
            .gateway
            .create_session(
                charge.payment_type,
                charge.amount,
                &book.title,
                &self.stripe.success_url,
                &self.stripe.cancel_url,
            )
            .await?;

        let payment = self
            .repository
            .payments
            .create(
                borrowing.id,
                charge.payment_type,
                charge.amount,
                Some(&session.id),
                Some(&session.url),
            )
            .await?;

        self.notifier
            .notify(return_message(&book.title, &claims.sub));

        let message = if actual_return_date > borrowing.expected_return_date {
            "Your borrowing was overdue. You'll have to pay a fine.".to_string()
        } else {
            "Thank you for the timely return of the book".to_string()
        };

        Ok(ReturnOutcome { message, payment })
    }
}

fn borrow_message(book_title: &str, user_email: &str) -> String {
    format!("New borrowing created: {} by {}", book_title, user_email)
}

fn return_message(book_title: &str, user_email: &str) -> String {
    format!("{} returned {}, payment pending", user_email, book_title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_messages_name_book_and_borrower() {
        assert_eq!(
            borrow_message("Dune", "reader@example.com"),
            "New borrowing created: Dune by reader@example.com"
        );
        assert_eq!(
            return_message("Dune", "reader@example.com"),
            "reader@example.com returned Dune, payment pending"
        );
    }
}
