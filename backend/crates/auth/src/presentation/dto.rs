//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

// ============================================================================
// OAuth
// ============================================================================

/// Query string of the provider redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user declined.
    pub error: Option<String>,
}

// ============================================================================
// Session Status
// ============================================================================

/// Session status response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    /// `edge` or `session`
    pub scheme: Option<&'static str>,
    pub user_id: Option<String>,
    pub workspace_id: Option<String>,
    /// Active membership for the target product.
    pub access: bool,
}

impl SessionStatusResponse {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            scheme: None,
            user_id: None,
            workspace_id: None,
            access: false,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Flat `{"error": "..."}` body of gate rejections.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

impl ErrorBody {
    pub const UNAUTHORIZED: Self = Self {
        error: "Unauthorized",
    };
    pub const FORBIDDEN: Self = Self { error: "Forbidden" };
}
