//! Principal
//!
//! An authenticated (user, workspace) pair. Both authentication schemes
//! produce one, and authorization only ever looks at this type.

use kernel::id::{UserId, WorkspaceId};

/// Which scheme produced the principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// Platform token verified by the edge gatekeeper.
    Edge,
    /// Browser session cookie.
    Session,
}

impl AuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Edge => "edge",
            AuthScheme::Session => "session",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub workspace_id: WorkspaceId,
    pub scheme: AuthScheme,
}
