//! Session Entity
//!
//! Server-side half of the browser session. Only the SHA-256 of the
//! cookie value is stored; the raw token exists in the `Set-Cookie`
//! header and nowhere else.

use chrono::{DateTime, Utc};
use kernel::id::{SessionId, UserId, WorkspaceId};

use crate::domain::value_object::session_token::TokenHash;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub token_hash: TokenHash,
    pub user_id: UserId,
    pub workspace_id: WorkspaceId,
    pub expires_at: DateTime<Utc>,
    /// Provider access token obtained at login, stored as received.
    pub upstream_access_token: Option<String>,
    pub upstream_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Expired once `now` reaches `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
