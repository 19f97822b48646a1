//! Business logic services

pub mod auth;
pub mod billing;
pub mod books;
pub mod borrowings;
pub mod gateway;
pub mod notifier;
pub mod payments;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, StripeConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub books: books::BooksService,
    pub borrowings: borrowings::BorrowingsService,
    pub payments: payments::PaymentsService,
    pub notifier: notifier::Notifier,
}

impl Services {
    /// Create all services with the given repository and collaborators
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        stripe_config: StripeConfig,
        gateway: Arc<dyn gateway::CheckoutGateway>,
        notifier: notifier::Notifier,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            books: books::BooksService::new(repository.clone()),
            borrowings: borrowings::BorrowingsService::new(
                repository.clone(),
                notifier.clone(),
                gateway.clone(),
                stripe_config.clone(),
            ),
            payments: payments::PaymentsService::new(repository, gateway, stripe_config),
            notifier,
        }
    }
}
