//! Auth Error Types
//!
//! Auth-specific failures, mapped onto the unified `kernel::error::AppError`
//! at the HTTP boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// A required secret or setting is absent at the point of use.
    #[error("Missing configuration: {0}")]
    Configuration(&'static str),

    /// Bad signature, malformed token, expired `exp`, disallowed algorithm.
    #[error("Invalid platform token")]
    TokenVerification(#[source] jsonwebtoken::errors::Error),

    /// Signature fine, but a required claim has no usable alias.
    #[error("Platform token is missing the {0} claim")]
    MissingClaims(&'static str),

    /// OAuth `state` missing on either side or not equal.
    #[error("OAuth state mismatch")]
    CsrfMismatch,

    /// The identity provider answered with an error or garbage.
    /// `status` is `None` when the request never got a response.
    #[error("Identity provider request failed (status {status:?})")]
    ExternalAuth { status: Option<u16>, body: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn external(status: Option<u16>, body: impl Into<String>) -> Self {
        AuthError::ExternalAuth {
            status,
            body: body.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::TokenVerification(_)
            | AuthError::MissingClaims(_) => ErrorKind::Unauthorized,
            AuthError::CsrfMismatch => ErrorKind::BadRequest,
            AuthError::ExternalAuth { .. } => ErrorKind::BadGateway,
            AuthError::Configuration(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError. Server-side failures get a fixed message so
    /// that upstream bodies, SQL and setting names stay in the logs.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Configuration(_) => {
                AppError::new(self.kind(), "Server configuration error")
            }
            AuthError::ExternalAuth { .. } => {
                AppError::new(self.kind(), "Identity provider request failed")
            }
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Like [`to_app_error`](Self::to_app_error), but database errors keep
    /// their classification (503 on pool exhaustion) and their source.
    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::Database(e) => AppError::from(e),
            other => other.to_app_error(),
        }
    }

    pub(crate) fn log(&self) {
        match self {
            AuthError::Configuration(name) => {
                tracing::error!(setting = name, "Auth configuration missing");
            }
            AuthError::ExternalAuth { status, body } => {
                tracing::error!(status = ?status, body = %body, "Identity provider error");
            }
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::TokenVerification(e) => {
                tracing::warn!(reason = ?e.kind(), "Platform token rejected");
            }
            AuthError::CsrfMismatch => {
                tracing::warn!("OAuth callback with mismatched state");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}
