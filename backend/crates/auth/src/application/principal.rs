//! Principal Resolution
//!
//! One interface, two strategies: the platform claims the gatekeeper
//! verified for this request, then the session cookie. The first one
//! that yields a principal wins, and everything after (the access gate)
//! only sees a [`Principal`].

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_store::SessionStore;
use crate::application::tenant_resolver::TenantResolver;
use crate::domain::entity::principal::{AuthScheme, Principal};
use crate::domain::repository::TenantStore;
use crate::domain::value_object::platform_claims::VerifiedClaims;
use crate::error::AuthResult;

/// What a request carries that a strategy may look at.
#[derive(Debug, Default, Clone, Copy)]
pub struct Credentials<'a> {
    /// Set only by the edge gatekeeper.
    pub edge_claims: Option<&'a VerifiedClaims>,
    pub session_token: Option<&'a str>,
}

#[trait_variant::make(PrincipalStrategy: Send)]
pub trait LocalPrincipalStrategy {
    /// `Ok(None)` means "not mine, try the next strategy".
    async fn resolve(&self, credentials: Credentials<'_>) -> AuthResult<Option<Principal>>;
}

/// Principal from verified platform claims.
pub struct EdgeClaimsStrategy<R: TenantStore> {
    tenants: TenantResolver<R>,
    config: Arc<AuthConfig>,
}

impl<R: TenantStore> EdgeClaimsStrategy<R> {
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            tenants: TenantResolver::new(repo),
            config,
        }
    }
}

impl<R: TenantStore> PrincipalStrategy for EdgeClaimsStrategy<R> {
    async fn resolve(&self, credentials: Credentials<'_>) -> AuthResult<Option<Principal>> {
        let Some(claims) = credentials.edge_claims else {
            return Ok(None);
        };
        let product_id = self.config.target_product()?;
        let tenancy = self.tenants.reconcile_edge(claims, product_id).await?;

        Ok(Some(Principal {
            user_id: tenancy.user.id,
            workspace_id: tenancy.workspace.id,
            scheme: AuthScheme::Edge,
        }))
    }
}

/// Principal from the session cookie.
pub struct SessionCookieStrategy<R: TenantStore> {
    store: SessionStore<R>,
}

impl<R: TenantStore> SessionCookieStrategy<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            store: SessionStore::new(repo),
        }
    }
}

impl<R: TenantStore> PrincipalStrategy for SessionCookieStrategy<R> {
    async fn resolve(&self, credentials: Credentials<'_>) -> AuthResult<Option<Principal>> {
        match credentials.session_token {
            Some(token) => self.store.resolve(token).await,
            None => Ok(None),
        }
    }
}

/// Two strategies tried in order.
pub struct PrincipalResolver<A, B> {
    first: A,
    second: B,
}

impl<A, B> PrincipalResolver<A, B>
where
    A: PrincipalStrategy + Sync,
    B: PrincipalStrategy + Sync,
{
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub async fn resolve(&self, credentials: Credentials<'_>) -> AuthResult<Option<Principal>> {
        if let Some(principal) = self.first.resolve(credentials).await? {
            return Ok(Some(principal));
        }
        self.second.resolve(credentials).await
    }
}

/// Edge claims first, then the session cookie.
pub fn default_resolver<R: TenantStore>(
    repo: Arc<R>,
    config: Arc<AuthConfig>,
) -> PrincipalResolver<EdgeClaimsStrategy<R>, SessionCookieStrategy<R>> {
    PrincipalResolver::new(
        EdgeClaimsStrategy::new(repo.clone(), config),
        SessionCookieStrategy::new(repo),
    )
}
