//! Payment Error Types
//!
//! Mapped onto `kernel::error::AppError` at the HTTP boundary, like
//! `auth::AuthError`.

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type PaymentResult<T> = Result<T, PaymentError>;

#[derive(Debug, Error)]
pub enum PaymentError {
    /// Unknown id, or a record of another workspace.
    #[error("Not found")]
    NotFound,

    #[error("Missing status")]
    MissingStatus,

    #[error("Status must be at most {max} characters")]
    StatusTooLong { max: usize },

    #[error("Missing company_id (or x-company-id header)")]
    MissingCompany,

    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Invalid JSON body")]
    InvalidBody(#[source] serde_json::Error),

    /// `WEBHOOK_SECRET` is not set.
    #[error("Webhook secret not configured")]
    WebhookNotConfigured,

    #[error("Unauthorized")]
    WebhookUnauthorized,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::NotFound => ErrorKind::NotFound,
            PaymentError::MissingStatus
            | PaymentError::StatusTooLong { .. }
            | PaymentError::MissingCompany
            | PaymentError::MissingFields
            | PaymentError::InvalidAmount
            | PaymentError::InvalidBody(_) => ErrorKind::BadRequest,
            PaymentError::WebhookUnauthorized => ErrorKind::Unauthorized,
            PaymentError::Auth(e) => e.kind(),
            PaymentError::WebhookNotConfigured
            | PaymentError::Database(_)
            | PaymentError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError; server-side detail stays in the logs.
    pub fn to_app_error(&self) -> AppError {
        match self {
            PaymentError::Auth(e) => e.to_app_error(),
            PaymentError::WebhookNotConfigured => {
                AppError::new(self.kind(), "Server configuration error")
            }
            PaymentError::Database(_) | PaymentError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Database and body errors go through the kernel conversions, which
    /// keep the source for logs.
    pub fn into_app_error(self) -> AppError {
        match self {
            PaymentError::Database(e) => AppError::from(e),
            PaymentError::InvalidBody(e) => AppError::from(e),
            PaymentError::Auth(e) => e.into_app_error(),
            other => other.to_app_error(),
        }
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        match &self {
            PaymentError::WebhookNotConfigured => {
                tracing::error!(setting = "WEBHOOK_SECRET", "Payment configuration missing");
            }
            PaymentError::Database(e) => tracing::error!(error = %e, "Payment database error"),
            PaymentError::Internal(msg) => tracing::error!(message = %msg, "Payment internal error"),
            PaymentError::Auth(e) => tracing::error!(error = %e, "Payment auth dependency error"),
            PaymentError::WebhookUnauthorized => tracing::warn!("Webhook secret mismatch"),
            _ => tracing::debug!(error = %self, "Payment request rejected"),
        }
        self.into_app_error().into_response()
    }
}
