//! Libris Library Borrowing Service
//!
//! A Rust REST JSON API for managing a library's books, borrowings and the
//! payments they generate, with Telegram notifications and Stripe Checkout.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
