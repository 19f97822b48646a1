//! Borrowing management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::borrowing::{Borrowing, BorrowingDetails, BorrowingQuery, CreateBorrowing},
};

use super::AuthenticatedUser;

/// Return response with the payment link
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Confirmation that the book came back
    pub success: String,
    /// On-time or overdue message
    pub message: String,
    /// Checkout link for the fee or fine
    pub link: Option<String>,
}

/// List borrowings visible to the caller
#[utoipa::path(
    get,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(BorrowingQuery),
    responses(
        (status = 200, description = "Borrowings", body = Vec<BorrowingDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_borrowings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BorrowingQuery>,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    let borrowings = state.services.borrowings.list(&claims, &query).await?;
    Ok(Json(borrowings))
}

/// Get borrowing details by ID
#[utoipa::path(
    get,
    path = "/borrowings/{id}",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Borrowing details", body = BorrowingDetails),
        (status = 404, description = "Borrowing not found")
    )
)]
pub async fn get_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowingDetails>> {
    let details = state.services.borrowings.get(&claims, id).await?;
    Ok(Json(details))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    request_body = CreateBorrowing,
    responses(
        (status = 201, description = "Borrowing created", body = Borrowing),
        (status = 400, description = "Book out of stock"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBorrowing>,
) -> AppResult<(StatusCode, Json<Borrowing>)> {
    let borrowing = state.services.borrowings.borrow(&claims, request).await?;
    Ok((StatusCode::CREATED, Json(borrowing)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrowings/{id}/return",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 400, description = "Already returned"),
        (status = 403, description = "Not the borrower"),
        (status = 404, description = "Borrowing not found")
    )
)]
pub async fn return_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let outcome = state.services.borrowings.return_book(&claims, id).await?;

    Ok(Json(ReturnResponse {
        success: "The book was successfully returned.".to_string(),
        message: outcome.message,
        link: outcome
            .payment
            .session_url
            .map(|url| format!("Pay here: {}", url)),
    }))
}
