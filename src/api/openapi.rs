//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrowings, health, payments};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "1.0.0",
        description = "Library Borrowing Service REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Borrowings
        borrowings::list_borrowings,
        borrowings::get_borrowing,
        borrowings::create_borrowing,
        borrowings::return_borrowing,
        // Payments
        payments::list_payments,
        payments::get_payment,
        payments::create_session,
        payments::payment_success,
        payments::payment_cancel,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            crate::models::user::RegisterUser,
            crate::models::user::AccountType,
            // Books
            crate::models::book::Book,
            crate::models::book::CoverType,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Borrowings
            crate::models::borrowing::Borrowing,
            crate::models::borrowing::BorrowingDetails,
            crate::models::borrowing::CreateBorrowing,
            borrowings::ReturnResponse,
            // Payments
            crate::models::payment::Payment,
            crate::models::payment::PaymentStatus,
            crate::models::payment::PaymentType,
            payments::SessionResponse,
            payments::PaymentResultResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "borrowings", description = "Borrowing lifecycle"),
        (name = "payments", description = "Fees, fines and checkout sessions")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
