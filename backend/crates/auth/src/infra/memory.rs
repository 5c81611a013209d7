//! In-Memory Repository
//!
//! Same contract as the PostgreSQL store, unique keys included. Backs the
//! unit and router tests, and local runs without a database.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{UserId, WorkspaceId};
use tokio::sync::Mutex;

use crate::domain::entity::{
    membership::{Membership, MembershipUpsert},
    session::Session,
    user::{User, UserProfile},
    workspace::Workspace,
};
use crate::domain::repository::{
    MembershipRepository, SessionRepository, UserRepository, WorkspaceRepository,
};
use crate::domain::value_object::session_token::TokenHash;
use crate::error::AuthResult;

#[derive(Default)]
struct State {
    users: HashMap<String, User>,
    workspaces: HashMap<String, Workspace>,
    memberships: HashMap<(UserId, WorkspaceId, String), Membership>,
    sessions: HashMap<TokenHash, Session>,
}

#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    state: Arc<Mutex<State>>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored session.
    pub async fn sessions(&self) -> Vec<Session> {
        self.state.lock().await.sessions.values().cloned().collect()
    }

    /// `(users, workspaces, memberships)` row counts.
    pub async fn counts(&self) -> (usize, usize, usize) {
        let state = self.state.lock().await;
        (state.users.len(), state.workspaces.len(), state.memberships.len())
    }
}

impl UserRepository for InMemoryAuthRepository {
    async fn upsert_user(&self, profile: &UserProfile) -> AuthResult<User> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .entry(profile.external_id.clone())
            .and_modify(|u| u.apply(profile))
            .or_insert_with(|| User::new(profile));
        Ok(user.clone())
    }

    async fn ensure_user(&self, external_id: &str) -> AuthResult<User> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .entry(external_id.to_string())
            .or_insert_with(|| {
                User::new(&UserProfile {
                    external_id: external_id.to_string(),
                    email: None,
                    name: None,
                })
            });
        Ok(user.clone())
    }
}

impl WorkspaceRepository for InMemoryAuthRepository {
    async fn upsert_workspace(
        &self,
        external_id: &str,
        name: Option<&str>,
    ) -> AuthResult<Workspace> {
        let mut state = self.state.lock().await;
        let workspace = state
            .workspaces
            .entry(external_id.to_string())
            .and_modify(|w| {
                w.name = name.map(str::to_string);
                w.updated_at = Utc::now();
            })
            .or_insert_with(|| Workspace::new(external_id, name.map(str::to_string)));
        Ok(workspace.clone())
    }

    async fn ensure_workspace(&self, external_id: &str) -> AuthResult<Workspace> {
        let mut state = self.state.lock().await;
        let workspace = state
            .workspaces
            .entry(external_id.to_string())
            .or_insert_with(|| Workspace::new(external_id, None));
        Ok(workspace.clone())
    }
}

impl MembershipRepository for InMemoryAuthRepository {
    async fn upsert_membership(&self, input: &MembershipUpsert) -> AuthResult<Membership> {
        let mut state = self.state.lock().await;
        let key = (input.user_id, input.workspace_id, input.product_id.clone());
        let membership = state
            .memberships
            .entry(key)
            .and_modify(|m| m.apply(input))
            .or_insert_with(|| Membership::new(input));
        Ok(membership.clone())
    }

    async fn find_membership(
        &self,
        user_id: UserId,
        workspace_id: WorkspaceId,
        product_id: &str,
    ) -> AuthResult<Option<Membership>> {
        let state = self.state.lock().await;
        Ok(state
            .memberships
            .get(&(user_id, workspace_id, product_id.to_string()))
            .cloned())
    }
}

impl SessionRepository for InMemoryAuthRepository {
    async fn create_session(&self, session: &Session) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        state.sessions.insert(session.token_hash, session.clone());
        Ok(())
    }

    async fn find_session(&self, token_hash: &TokenHash) -> AuthResult<Option<Session>> {
        let state = self.state.lock().await;
        Ok(state.sessions.get(token_hash).cloned())
    }

    async fn delete_session(&self, token_hash: &TokenHash) -> AuthResult<u64> {
        let mut state = self.state.lock().await;
        Ok(state.sessions.remove(token_hash).map_or(0, |_| 1))
    }

    async fn cleanup_expired_sessions(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - state.sessions.len()) as u64)
    }
}
