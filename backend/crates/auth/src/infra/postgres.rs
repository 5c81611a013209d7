//! PostgreSQL Repository Implementations
//!
//! Upserts are single `INSERT .. ON CONFLICT .. RETURNING` statements.
//! The `ensure_*` variants use a no-op `DO UPDATE` so the existing row
//! still comes back through `RETURNING`.

use chrono::{DateTime, Utc};
use kernel::id::{MembershipId, SessionId, UserId, WorkspaceId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    membership::{Membership, MembershipUpsert},
    session::Session,
    user::{User, UserProfile},
    workspace::Workspace,
};
use crate::domain::repository::{
    MembershipRepository, SessionRepository, UserRepository, WorkspaceRepository,
};
use crate::domain::value_object::{membership_status::MembershipStatus, session_token::TokenHash};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn upsert_user(&self, profile: &UserProfile) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, external_id, email, name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (external_id) DO UPDATE SET
                email = EXCLUDED.email,
                name = EXCLUDED.name,
                updated_at = now()
            RETURNING id, external_id, email, name, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&profile.external_id)
        .bind(&profile.email)
        .bind(&profile.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_user())
    }

    async fn ensure_user(&self, external_id: &str) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, external_id)
            VALUES ($1, $2)
            ON CONFLICT (external_id) DO UPDATE SET external_id = users.external_id
            RETURNING id, external_id, email, name, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(external_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_user())
    }
}

// ============================================================================
// Workspace Repository Implementation
// ============================================================================

impl WorkspaceRepository for PgAuthRepository {
    async fn upsert_workspace(
        &self,
        external_id: &str,
        name: Option<&str>,
    ) -> AuthResult<Workspace> {
        let row = sqlx::query_as::<_, WorkspaceRow>(
            r#"
            INSERT INTO workspaces (id, external_id, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (external_id) DO UPDATE SET
                name = EXCLUDED.name,
                updated_at = now()
            RETURNING id, external_id, name, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(external_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_workspace())
    }

    async fn ensure_workspace(&self, external_id: &str) -> AuthResult<Workspace> {
        let row = sqlx::query_as::<_, WorkspaceRow>(
            r#"
            INSERT INTO workspaces (id, external_id)
            VALUES ($1, $2)
            ON CONFLICT (external_id) DO UPDATE SET external_id = workspaces.external_id
            RETURNING id, external_id, name, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(external_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_workspace())
    }
}

// ============================================================================
// Membership Repository Implementation
// ============================================================================

impl MembershipRepository for PgAuthRepository {
    async fn upsert_membership(&self, input: &MembershipUpsert) -> AuthResult<Membership> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            INSERT INTO memberships (
                id,
                user_id,
                workspace_id,
                product_id,
                status,
                external_membership_id
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, workspace_id, product_id) DO UPDATE SET
                status = EXCLUDED.status,
                external_membership_id = EXCLUDED.external_membership_id,
                updated_at = now()
            RETURNING
                id,
                user_id,
                workspace_id,
                product_id,
                status,
                external_membership_id,
                created_at,
                updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.user_id.as_uuid())
        .bind(input.workspace_id.as_uuid())
        .bind(&input.product_id)
        .bind(input.status.as_str())
        .bind(&input.external_membership_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_membership())
    }

    async fn find_membership(
        &self,
        user_id: UserId,
        workspace_id: WorkspaceId,
        product_id: &str,
    ) -> AuthResult<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT
                id,
                user_id,
                workspace_id,
                product_id,
                status,
                external_membership_id,
                created_at,
                updated_at
            FROM memberships
            WHERE user_id = $1 AND workspace_id = $2 AND product_id = $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(workspace_id.as_uuid())
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MembershipRow::into_membership))
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create_session(&self, session: &Session) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id,
                token_hash,
                user_id,
                workspace_id,
                expires_at,
                upstream_access_token,
                upstream_token_expires_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(session.id.as_uuid())
        .bind(session.token_hash.as_bytes().as_slice())
        .bind(session.user_id.as_uuid())
        .bind(session.workspace_id.as_uuid())
        .bind(session.expires_at)
        .bind(&session.upstream_access_token)
        .bind(session.upstream_token_expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(&self, token_hash: &TokenHash) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                id,
                token_hash,
                user_id,
                workspace_id,
                expires_at,
                upstream_access_token,
                upstream_token_expires_at,
                created_at
            FROM sessions
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash.as_bytes().as_slice())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SessionRow::into_session).transpose()
    }

    async fn delete_session(&self, token_hash: &TokenHash) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash.as_bytes().as_slice())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn cleanup_expired_sessions(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    external_id: String,
    email: Option<String>,
    name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: UserId::from_uuid(self.id),
            external_id: self.external_id,
            email: self.email,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct WorkspaceRow {
    id: Uuid,
    external_id: String,
    name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WorkspaceRow {
    fn into_workspace(self) -> Workspace {
        Workspace {
            id: WorkspaceId::from_uuid(self.id),
            external_id: self.external_id,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MembershipRow {
    id: Uuid,
    user_id: Uuid,
    workspace_id: Uuid,
    product_id: String,
    status: String,
    external_membership_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MembershipRow {
    fn into_membership(self) -> Membership {
        Membership {
            id: MembershipId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            workspace_id: WorkspaceId::from_uuid(self.workspace_id),
            product_id: self.product_id,
            status: MembershipStatus::new(self.status),
            external_membership_id: self.external_membership_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    token_hash: Vec<u8>,
    user_id: Uuid,
    workspace_id: Uuid,
    expires_at: DateTime<Utc>,
    upstream_access_token: Option<String>,
    upstream_token_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> AuthResult<Session> {
        let token_hash = TokenHash::from_bytes(&self.token_hash).ok_or_else(|| {
            AuthError::Internal(format!("Invalid token_hash length: {}", self.token_hash.len()))
        })?;

        Ok(Session {
            id: SessionId::from_uuid(self.id),
            token_hash,
            user_id: UserId::from_uuid(self.user_id),
            workspace_id: WorkspaceId::from_uuid(self.workspace_id),
            expires_at: self.expires_at,
            upstream_access_token: self.upstream_access_token,
            upstream_token_expires_at: self.upstream_token_expires_at,
            created_at: self.created_at,
        })
    }
}
