//! Payment endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::payment::Payment,
};

use super::AuthenticatedUser;

/// Session query parameter used by the success/cancel redirects
#[derive(Deserialize, IntoParams)]
pub struct SessionQuery {
    pub session_id: Option<String>,
}

/// Checkout session response
#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub session_id: String,
    pub session_url: String,
}

/// Payment result message
#[derive(Serialize, ToSchema)]
pub struct PaymentResultResponse {
    pub message: String,
}

/// List payments visible to the caller
#[utoipa::path(
    get,
    path = "/payments",
    tag = "payments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payments", body = Vec<Payment>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_payments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Payment>>> {
    let payments = state.services.payments.list(&claims).await?;
    Ok(Json(payments))
}

/// Get payment details by ID
#[utoipa::path(
    get,
    path = "/payments/{id}",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Payment ID")
    ),
    responses(
        (status = 200, description = "Payment details", body = Payment),
        (status = 403, description = "Not the payment's owner"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn get_payment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Payment>> {
    let payment = state.services.payments.get(&claims, id).await?;
    Ok(Json(payment))
}

/// Create a checkout session for a payment
#[utoipa::path(
    post,
    path = "/payments/{id}/session",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Payment ID")
    ),
    responses(
        (status = 200, description = "Session created", body = SessionResponse),
        (status = 403, description = "Not the payment's owner"),
        (status = 404, description = "Payment not found"),
        (status = 502, description = "Gateway failure")
    )
)]
pub async fn create_session(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<SessionResponse>> {
    let payment = state.services.payments.create_session(&claims, id).await?;

    // Both fields were just written by create_session
    let (session_id, session_url) = payment
        .session_id
        .zip(payment.session_url)
        .ok_or_else(|| AppError::Internal("Session missing after creation".to_string()))?;

    Ok(Json(SessionResponse {
        session_id,
        session_url,
    }))
}

/// Handle a successful checkout redirect
#[utoipa::path(
    get,
    path = "/payments/success",
    tag = "payments",
    params(SessionQuery),
    responses(
        (status = 200, description = "Payment marked as paid", body = PaymentResultResponse),
        (status = 400, description = "Session ID missing"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn payment_success(
    State(state): State<crate::AppState>,
    Query(query): Query<SessionQuery>,
) -> AppResult<Json<PaymentResultResponse>> {
    let session_id = query
        .session_id
        .ok_or_else(|| AppError::BadRequest("Session ID not found.".to_string()))?;

    state.services.payments.confirm_success(&session_id).await?;

    Ok(Json(PaymentResultResponse {
        message: "Payment was successful!".to_string(),
    }))
}

/// Handle a cancelled checkout redirect
#[utoipa::path(
    get,
    path = "/payments/cancel",
    tag = "payments",
    params(SessionQuery),
    responses(
        (status = 200, description = "Payment left pending", body = PaymentResultResponse),
        (status = 400, description = "Session ID missing")
    )
)]
pub async fn payment_cancel(
    Query(query): Query<SessionQuery>,
) -> AppResult<Json<PaymentResultResponse>> {
    if query.session_id.is_none() {
        return Err(AppError::BadRequest("Session ID not found.".to_string()));
    }

    Ok(Json(PaymentResultResponse {
        message: "Payment was not successful and can be paid later. The session is available for 24h."
            .to_string(),
    }))
}
