//! Payment management service

use std::sync::Arc;

use crate::{
    config::StripeConfig,
    error::{AppError, AppResult},
    models::{payment::Payment, user::UserClaims},
    repository::{payments::PaymentContext, Repository},
    services::gateway::{CheckoutGateway, CheckoutSession},
};

#[derive(Clone)]
pub struct PaymentsService {
    repository: Repository,
    gateway: Arc<dyn CheckoutGateway>,
    stripe: StripeConfig,
}

impl PaymentsService {
    pub fn new(
        repository: Repository,
        gateway: Arc<dyn CheckoutGateway>,
        stripe: StripeConfig,
    ) -> Self {
        Self {
            repository,
            gateway,
            stripe,
        }
    }

    /// List payments visible to the caller: admins see everything, regular
    /// users only payments on their own borrowings
    pub async fn list(&self, claims: &UserClaims) -> AppResult<Vec<Payment>> {
        let user_id = if claims.is_admin() {
            None
        } else {
            Some(claims.user_id)
        };
        self.repository.payments.list(user_id).await
    }

    /// Get one payment; only its owner or an admin may see it
    pub async fn get(&self, claims: &UserClaims, id: i32) -> AppResult<Payment> {
        let context = self.repository.payments.get_context(id).await?;

        if !claims.is_admin() && context.owner_id != claims.user_id {
            return Err(AppError::Authorization(
                "You cannot view another user's payment".to_string(),
            ));
        }

        Ok(context.payment)
    }

    /// (Re)create a checkout session for an existing payment and store it
    pub async fn create_session(&self, claims: &UserClaims, id: i32) -> AppResult<Payment> {
        let context = self.repository.payments.get_context(id).await?;

        if !claims.is_admin() && context.owner_id != claims.user_id {
            return Err(AppError::Authorization(
                "You cannot pay another user's payment".to_string(),
            ));
        }

        let session = open_session(self.gateway.as_ref(), &context, &self.stripe).await?;

        self.repository
            .payments
            .set_session(id, &session.id, &session.url)
            .await
    }

    /// Mark the payment behind a completed checkout session as paid
    pub async fn confirm_success(&self, session_id: &str) -> AppResult<Payment> {
        self.repository.payments.mark_paid_by_session(session_id).await
    }
}

/// Open a gateway session for a stored payment, reusing its computed amount
async fn open_session(
    gateway: &dyn CheckoutGateway,
    context: &PaymentContext,
    stripe: &StripeConfig,
) -> AppResult<CheckoutSession> {
    gateway
        .create_session(
            context.payment.payment_type,
            context.payment.amount,
            &context.book_title,
            &stripe.success_url,
            &stripe.cancel_url,
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payment::{PaymentStatus, PaymentType};
    use crate::services::gateway::MockCheckoutGateway;
    use chrono::Utc;
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    fn context(payment_type: PaymentType, amount: Decimal) -> PaymentContext {
        PaymentContext {
            payment: Payment {
                id: 1,
                status: PaymentStatus::Pending,
                payment_type,
                borrowing_id: 10,
                amount,
                session_id: None,
                session_url: None,
                created_at: Utc::now(),
            },
            owner_id: 7,
            book_title: "Dune".to_string(),
        }
    }

    #[tokio::test]
    async fn session_uses_stored_amount_and_book_title() {
        let mut gateway = MockCheckoutGateway::new();
        gateway
            .expect_create_session()
            .with(
                eq(PaymentType::Fine),
                eq(Decimal::new(5994, 2)),
                eq("Dune"),
                eq("https://example.com/ok"),
                eq("https://example.com/ko"),
            )
            .times(1)
            .returning(|_, _, _, _, _| {
                Ok(CheckoutSession {
                    id: "cs_test_123".to_string(),
                    url: "https://checkout.stripe.com/pay/cs_test_123".to_string(),
                })
            });

        let stripe = StripeConfig {
            secret_key: "sk_test".to_string(),
            success_url: "https://example.com/ok".to_string(),
            cancel_url: "https://example.com/ko".to_string(),
        };

        let session = open_session(
            &gateway,
            &context(PaymentType::Fine, Decimal::new(5994, 2)),
            &stripe,
        )
        .await
        .unwrap();

        assert_eq!(session.id, "cs_test_123");
    }

    #[tokio::test]
    async fn gateway_failures_surface_as_errors() {
        let mut gateway = MockCheckoutGateway::new();
        gateway
            .expect_create_session()
            .returning(|_, _, _, _, _| Err(AppError::Gateway("boom".to_string())));

        let stripe = StripeConfig {
            secret_key: "sk_test".to_string(),
            success_url: "s".to_string(),
            cancel_url: "c".to_string(),
        };

        let err = open_session(
            &gateway,
            &context(PaymentType::Payment, Decimal::ONE),
            &stripe,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Gateway(_)));
    }
}
