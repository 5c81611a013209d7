//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer (`infra::postgres`, `infra::memory`).
//!
//! Every upsert is a single atomic statement keyed by a unique
//! constraint, so retries and concurrent logins never duplicate rows.

use chrono::{DateTime, Utc};
use kernel::id::{UserId, WorkspaceId};

use crate::domain::entity::{
    membership::{Membership, MembershipUpsert},
    session::Session,
    user::{User, UserProfile},
    workspace::Workspace,
};
use crate::domain::value_object::session_token::TokenHash;
use crate::error::AuthResult;

#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create or update by external id; email and name are overwritten.
    async fn upsert_user(&self, profile: &UserProfile) -> AuthResult<User>;

    /// Create by external id if missing. Existing rows are returned untouched.
    async fn ensure_user(&self, external_id: &str) -> AuthResult<User>;
}

#[trait_variant::make(WorkspaceRepository: Send)]
pub trait LocalWorkspaceRepository {
    /// Create or update by external id; name is overwritten.
    async fn upsert_workspace(&self, external_id: &str, name: Option<&str>)
    -> AuthResult<Workspace>;

    /// Create by external id if missing. Existing rows are returned untouched.
    async fn ensure_workspace(&self, external_id: &str) -> AuthResult<Workspace>;
}

#[trait_variant::make(MembershipRepository: Send)]
pub trait LocalMembershipRepository {
    /// Create or update by `(user, workspace, product)`; status and
    /// external membership id are overwritten.
    async fn upsert_membership(&self, input: &MembershipUpsert) -> AuthResult<Membership>;

    async fn find_membership(
        &self,
        user_id: UserId,
        workspace_id: WorkspaceId,
        product_id: &str,
    ) -> AuthResult<Option<Membership>>;
}

#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    async fn create_session(&self, session: &Session) -> AuthResult<()>;

    /// Look up by hash. Expired rows are returned too; callers decide.
    async fn find_session(&self, token_hash: &TokenHash) -> AuthResult<Option<Session>>;

    /// Delete by hash. Returns the number of rows removed (0 or 1).
    async fn delete_session(&self, token_hash: &TokenHash) -> AuthResult<u64>;

    /// Delete every session with `expires_at <= now`.
    async fn cleanup_expired_sessions(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Everything the auth use cases need from one store handle.
pub trait TenantStore:
    UserRepository + WorkspaceRepository + MembershipRepository + SessionRepository + Clone + Sync + 'static
{
}

impl<T> TenantStore for T where
    T: UserRepository
        + WorkspaceRepository
        + MembershipRepository
        + SessionRepository
        + Clone
        + Sync
        + 'static
{
}
