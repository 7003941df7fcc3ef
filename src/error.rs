use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::ledger::models::CommitmentStatus;

/// Top-level error type for the entire application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Trip not found: {0}")]
    TripNotFound(Uuid),

    #[error("Commitment not found: {0}")]
    CommitmentNotFound(Uuid),

    #[error("Duplicate commitment id: {0}")]
    Duplicate(Uuid),

    #[error("Invalid status transition: commitment {id} is already {current:?}")]
    InvalidTransition {
        id: Uuid,
        current: CommitmentStatus,
    },

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Gateway-related errors
///
/// Authorization failures abort a pledge before any record is created.
/// Capture failures are recorded per commitment and never re-raised to the
/// caller whose pledge triggered the settlement pass.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Authorization declined: {0}")]
    AuthorizationDeclined(String),

    #[error("Capture declined for authorization {authorization_id}: {reason}")]
    CaptureDeclined {
        authorization_id: String,
        reason: String,
    },

    #[error("Unknown authorization: {0}")]
    UnknownAuthorization(String),

    #[error("Gateway error: {0}")]
    Gateway(String),
}

/// API error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            AppError::TripNotFound(id) => (
                StatusCode::NOT_FOUND,
                "TRIP_NOT_FOUND",
                format!("Trip not found: {}", id),
                Some(serde_json::json!({"trip_id": id})),
            ),
            AppError::CommitmentNotFound(id) => (
                StatusCode::NOT_FOUND,
                "COMMITMENT_NOT_FOUND",
                format!("Commitment not found: {}", id),
                Some(serde_json::json!({"commitment_id": id})),
            ),
            AppError::Payment(PaymentError::AuthorizationDeclined(reason)) => (
                StatusCode::BAD_REQUEST,
                "AUTHORIZATION_DECLINED",
                format!("Payment authorization declined: {}", reason),
                None,
            ),
            AppError::Payment(err) => (
                StatusCode::BAD_GATEWAY,
                "PAYMENT_GATEWAY_ERROR",
                format!("Payment error: {}", err),
                None,
            ),
            AppError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                msg,
                None,
            ),
            // Duplicate and InvalidTransition are invariant violations, not
            // user errors; surface them as opaque internal failures.
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: message,
            error_code: error_code.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal(format!("Error converting: {:?}", error))
    }
}

impl From<reqwest::Error> for PaymentError {
    fn from(error: reqwest::Error) -> Self {
        PaymentError::Gateway(format!("HTTP request error: {:?}", error))
    }
}

/// Result type alias for the application
pub type AppResult<T> = Result<T, AppError>;
