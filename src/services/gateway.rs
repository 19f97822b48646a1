//! Payment gateway integration (Stripe Checkout)
//!
//! The service layer talks to the gateway through [`CheckoutGateway`]; the
//! amount goes in, a payable session comes back. Everything past that
//! boundary is Stripe's problem.

use async_trait::async_trait;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::Deserialize;

use crate::{
    config::StripeConfig,
    error::{AppError, AppResult},
    models::payment::PaymentType,
};

#[cfg(test)]
use mockall::automock;

const STRIPE_API_URL: &str = "https://api.stripe.com/v1/checkout/sessions";

/// A created checkout session: where to send the user, and how to find the
/// payment again when they come back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Turn a computed amount into a payable checkout session
    async fn create_session(
        &self,
        payment_type: PaymentType,
        amount: Decimal,
        book_title: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> AppResult<CheckoutSession>;
}

/// Stripe-backed gateway using the Checkout Sessions API
#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: config.secret_key.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: String,
}

#[async_trait]
impl CheckoutGateway for StripeGateway {
    async fn create_session(
        &self,
        payment_type: PaymentType,
        amount: Decimal,
        book_title: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> AppResult<CheckoutSession> {
        let unit_amount = amount_to_cents(amount)?.to_string();
        let product_name = format!("{} for {}", payment_type, book_title);

        let params = [
            ("payment_method_types[]", "card"),
            ("mode", "payment"),
            ("line_items[0][price_data][currency]", "usd"),
            ("line_items[0][price_data][product_data][name]", product_name.as_str()),
            ("line_items[0][price_data][unit_amount]", unit_amount.as_str()),
            ("line_items[0][quantity]", "1"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
        ];

        let response = self
            .client
            .post(STRIPE_API_URL)
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Stripe request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Stripe rejected session creation ({}): {}", status, body);
            return Err(AppError::Gateway(format!(
                "Stripe rejected session creation: {}",
                status
            )));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("Invalid Stripe response: {}", e)))?;

        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }
}

/// Stripe wants the amount in the currency's smallest unit
fn amount_to_cents(amount: Decimal) -> AppResult<i64> {
    (amount * Decimal::from(100))
        .trunc()
        .to_i64()
        .ok_or_else(|| AppError::Internal(format!("Amount {} out of range", amount)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_convert_to_cents() {
        assert_eq!(amount_to_cents(Decimal::new(1998, 2)).unwrap(), 1998);
        assert_eq!(amount_to_cents(Decimal::new(5994, 2)).unwrap(), 5994);
        assert_eq!(amount_to_cents(Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn fractional_cents_are_truncated() {
        // 1.005 -> 100 cents, matching integer truncation
        assert_eq!(amount_to_cents(Decimal::new(1005, 3)).unwrap(), 100);
    }
}
