//! Session Store
//!
//! Opaque browser sessions: create, resolve and destroy by raw token,
//! while the repository only ever sees [`TokenHash`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{SessionId, UserId, WorkspaceId};

use crate::domain::entity::principal::{AuthScheme, Principal};
use crate::domain::entity::session::Session;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::session_token::{SessionToken, TokenHash};
use crate::error::AuthResult;

/// Input of [`SessionStore::create`].
#[derive(Clone)]
pub struct NewSession {
    pub user_id: UserId,
    pub workspace_id: WorkspaceId,
    pub expires_at: DateTime<Utc>,
    pub upstream_access_token: Option<String>,
    pub upstream_token_expires_at: Option<DateTime<Utc>>,
}

pub struct SessionStore<R>
where
    R: SessionRepository,
{
    repo: Arc<R>,
}

impl<R> SessionStore<R>
where
    R: SessionRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Persist a new session and hand back the raw token.
    ///
    /// This is the only place the raw token exists server-side.
    pub async fn create(&self, input: NewSession) -> AuthResult<SessionToken> {
        let token = SessionToken::generate();
        let session = Session {
            id: SessionId::new(),
            token_hash: token.hash(),
            user_id: input.user_id,
            workspace_id: input.workspace_id,
            expires_at: input.expires_at,
            upstream_access_token: input.upstream_access_token,
            upstream_token_expires_at: input.upstream_token_expires_at,
            created_at: Utc::now(),
        };

        self.repo.create_session(&session).await?;

        tracing::info!(
            session_id = %session.id,
            user_id = %session.user_id,
            workspace_id = %session.workspace_id,
            expires_at = %session.expires_at,
            "Session created"
        );

        Ok(token)
    }

    /// Principal for a raw token, or `None` if unknown or expired.
    ///
    /// Expired rows are left in place.
    pub async fn resolve(&self, raw: &str) -> AuthResult<Option<Principal>> {
        let Some(session) = self.repo.find_session(&TokenHash::of(raw)).await? else {
            return Ok(None);
        };

        if session.is_expired_at(Utc::now()) {
            tracing::debug!(session_id = %session.id, "Expired session presented");
            return Ok(None);
        }

        Ok(Some(Principal {
            user_id: session.user_id,
            workspace_id: session.workspace_id,
            scheme: AuthScheme::Session,
        }))
    }

    /// Delete by raw token. Unknown tokens are not an error and the
    /// caller cannot tell the two cases apart.
    pub async fn destroy(&self, raw: &str) -> AuthResult<()> {
        let deleted = self.repo.delete_session(&TokenHash::of(raw)).await?;
        tracing::debug!(deleted, "Session destroy");
        Ok(())
    }
}
