//! Access Gate
//!
//! The single authorization decision: does this principal hold an active
//! membership for the target product in its workspace?

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::principal::Principal;
use crate::domain::repository::MembershipRepository;
use crate::error::AuthResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }
}

pub struct AccessGate<R>
where
    R: MembershipRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> AccessGate<R>
where
    R: MembershipRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// A missing membership row is a denial, not an error.
    pub async fn check(&self, principal: &Principal) -> AuthResult<AccessDecision> {
        let product_id = self.config.target_product()?;

        let membership = self
            .repo
            .find_membership(principal.user_id, principal.workspace_id, product_id)
            .await?;

        let decision = match membership {
            Some(m) if m.status.is_active() => AccessDecision::Granted,
            _ => AccessDecision::Denied,
        };

        tracing::debug!(
            user_id = %principal.user_id,
            workspace_id = %principal.workspace_id,
            ?decision,
            "Access checked"
        );

        Ok(decision)
    }
}
