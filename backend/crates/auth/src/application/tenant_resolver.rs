//! Tenant Resolver
//!
//! Turns provider identity data into local user, workspace and
//! membership rows. Every write is an upsert on a unique key, so running
//! the same reconciliation twice leaves one row of each.

use std::sync::Arc;

use crate::domain::entity::{
    membership::{Membership, MembershipUpsert},
    user::{User, UserProfile},
    workspace::Workspace,
};
use crate::domain::provider::{Viewer, ViewerMembership};
use crate::domain::repository::{MembershipRepository, UserRepository, WorkspaceRepository};
use crate::domain::value_object::{
    membership_status::MembershipStatus, platform_claims::VerifiedClaims,
};
use crate::error::AuthResult;

/// The reconciled rows.
#[derive(Debug, Clone)]
pub struct Tenancy {
    pub user: User,
    pub workspace: Workspace,
    pub membership: Membership,
}

pub struct TenantResolver<R>
where
    R: UserRepository + WorkspaceRepository + MembershipRepository,
{
    repo: Arc<R>,
}

impl<R> TenantResolver<R>
where
    R: UserRepository + WorkspaceRepository + MembershipRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Reconcile an OAuth viewer and its matched membership, if any.
    ///
    /// Without a match the viewer lands in a personal workspace with an
    /// inactive membership: signed in, not entitled.
    pub async fn reconcile(
        &self,
        viewer: &Viewer,
        matched: Option<&ViewerMembership>,
        product_id: &str,
    ) -> AuthResult<Tenancy> {
        let business = matched.and_then(|m| m.business.as_ref());
        let workspace_external_id = business
            .map(|b| b.id.clone())
            .unwrap_or_else(|| Workspace::personal_external_id(&viewer.id));
        let workspace_name = business.and_then(|b| b.name.as_deref());

        let user = self
            .repo
            .upsert_user(&UserProfile {
                external_id: viewer.id.clone(),
                email: viewer.email.clone(),
                name: viewer.name.clone(),
            })
            .await?;

        let workspace = self
            .repo
            .upsert_workspace(&workspace_external_id, workspace_name)
            .await?;

        let status = if matched.is_some() {
            MembershipStatus::active()
        } else {
            MembershipStatus::inactive()
        };

        let membership = self
            .repo
            .upsert_membership(&MembershipUpsert {
                user_id: user.id,
                workspace_id: workspace.id,
                product_id: product_id.to_string(),
                status,
                external_membership_id: matched.map(|m| m.id.clone()),
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            workspace_id = %workspace.id,
            workspace = %workspace.external_id,
            status = %membership.status,
            "Tenant reconciled"
        );

        Ok(Tenancy {
            user,
            workspace,
            membership,
        })
    }

    /// Reconcile verified platform claims.
    ///
    /// The platform only issues tokens to members with access, so the
    /// membership is recorded as active. Profile and workspace name are
    /// left alone; the platform token carries neither.
    pub async fn reconcile_edge(
        &self,
        claims: &VerifiedClaims,
        product_id: &str,
    ) -> AuthResult<Tenancy> {
        let user = self.repo.ensure_user(&claims.user_id).await?;
        let workspace = self.repo.ensure_workspace(&claims.company_id).await?;
        let membership = self
            .repo
            .upsert_membership(&MembershipUpsert {
                user_id: user.id,
                workspace_id: workspace.id,
                product_id: product_id.to_string(),
                status: MembershipStatus::active(),
                external_membership_id: Some(claims.membership_id.clone()),
            })
            .await?;

        Ok(Tenancy {
            user,
            workspace,
            membership,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::BusinessRef;
    use crate::infra::memory::InMemoryAuthRepository;

    fn viewer(email: &str) -> Viewer {
        Viewer {
            id: "user_1".into(),
            email: Some(email.into()),
            name: Some("Ann".into()),
            memberships: vec![ViewerMembership {
                id: "mem_1".into(),
                status: MembershipStatus::new("active"),
                product_id: Some("prod".into()),
                business: Some(BusinessRef {
                    id: "biz_1".into(),
                    name: Some("Acme".into()),
                }),
            }],
        }
    }

    #[tokio::test]
    async fn test_matched_membership_uses_business_workspace() {
        let repo = InMemoryAuthRepository::new();
        let resolver = TenantResolver::new(Arc::new(repo.clone()));
        let viewer = viewer("a@example.com");

        let tenancy = resolver
            .reconcile(&viewer, viewer.entitlement("prod"), "prod")
            .await
            .unwrap();

        assert_eq!(tenancy.workspace.external_id, "biz_1");
        assert_eq!(tenancy.workspace.name.as_deref(), Some("Acme"));
        assert!(tenancy.membership.status.is_active());
        assert_eq!(tenancy.membership.external_membership_id.as_deref(), Some("mem_1"));
    }

    #[tokio::test]
    async fn test_no_match_falls_back_to_personal_workspace() {
        let repo = InMemoryAuthRepository::new();
        let resolver = TenantResolver::new(Arc::new(repo.clone()));
        let viewer = viewer("a@example.com");

        let tenancy = resolver.reconcile(&viewer, None, "prod").await.unwrap();

        assert_eq!(tenancy.workspace.external_id, "personal_user_1");
        assert_eq!(tenancy.workspace.name, None);
        assert_eq!(tenancy.membership.status, MembershipStatus::inactive());
        assert_eq!(tenancy.membership.external_membership_id, None);
    }

    #[tokio::test]
    async fn test_repeat_reconcile_updates_in_place() {
        let repo = InMemoryAuthRepository::new();
        let resolver = TenantResolver::new(Arc::new(repo.clone()));

        let first_viewer = viewer("old@example.com");
        let first = resolver
            .reconcile(&first_viewer, first_viewer.entitlement("prod"), "prod")
            .await
            .unwrap();

        let mut second_viewer = viewer("new@example.com");
        second_viewer.memberships[0].business = Some(BusinessRef {
            id: "biz_1".into(),
            name: Some("Acme Inc".into()),
        });
        let second = resolver
            .reconcile(&second_viewer, second_viewer.entitlement("prod"), "prod")
            .await
            .unwrap();

        assert_eq!(first.user.id, second.user.id);
        assert_eq!(first.workspace.id, second.workspace.id);
        assert_eq!(first.membership.id, second.membership.id);
        assert_eq!(second.user.email.as_deref(), Some("new@example.com"));
        assert_eq!(second.workspace.name.as_deref(), Some("Acme Inc"));
        assert_eq!(repo.counts().await, (1, 1, 1));

        // No entitlement: same user, personal workspace, inactive membership.
        let third = resolver.reconcile(&second_viewer, None, "prod").await.unwrap();
        assert_eq!(third.user.id, first.user.id);
        assert_eq!(third.workspace.external_id, "personal_user_1");
        assert!(!third.membership.status.is_active());
        assert_eq!(repo.counts().await, (1, 2, 2));
    }

    #[tokio::test]
    async fn test_reconcile_edge_is_idempotent_and_keeps_profile() {
        let repo = InMemoryAuthRepository::new();
        let resolver = TenantResolver::new(Arc::new(repo.clone()));

        let viewer = viewer("a@example.com");
        resolver
            .reconcile(&viewer, viewer.entitlement("prod"), "prod")
            .await
            .unwrap();

        let claims = VerifiedClaims {
            company_id: "biz_1".into(),
            user_id: "user_1".into(),
            membership_id: "mem_edge".into(),
        };
        let a = resolver.reconcile_edge(&claims, "prod").await.unwrap();
        let b = resolver.reconcile_edge(&claims, "prod").await.unwrap();

        assert_eq!(a.membership.id, b.membership.id);
        assert_eq!(b.user.email.as_deref(), Some("a@example.com"));
        assert_eq!(b.workspace.name.as_deref(), Some("Acme"));
        assert_eq!(b.membership.external_membership_id.as_deref(), Some("mem_edge"));
        assert_eq!(repo.counts().await, (1, 1, 1));
    }
}
