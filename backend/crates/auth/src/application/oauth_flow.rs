//! OAuth Flow Use Case
//!
//! Authorization-code login against the identity provider:
//! [`OAuthFlowUseCase::initiate`] mints the CSRF `state` and the authorize
//! URL; [`OAuthFlowUseCase::callback`] checks `state`, exchanges the code,
//! reconciles the tenant and opens a session.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use platform::crypto::{constant_time_eq, random_token};
use reqwest::Url;

use crate::application::config::AuthConfig;
use crate::application::session_store::{NewSession, SessionStore};
use crate::application::tenant_resolver::TenantResolver;
use crate::domain::provider::{ClientCredentials, IdentityProvider};
use crate::domain::repository::TenantStore;
use crate::domain::value_object::session_token::SessionToken;
use crate::error::{AuthError, AuthResult};

/// Random bytes behind the `state` parameter.
const STATE_BYTES: usize = 24;

/// Output of [`OAuthFlowUseCase::initiate`].
#[derive(Debug, Clone)]
pub struct OAuthInitiation {
    /// Goes into the short-lived state cookie.
    pub state: String,
    pub authorize_url: String,
}

/// What the callback request carried.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub state_cookie: Option<String>,
}

/// Output of [`OAuthFlowUseCase::callback`].
#[derive(Debug)]
pub struct CallbackOutcome {
    pub session_token: SessionToken,
    /// Whether the viewer holds an active membership for the product.
    pub active: bool,
    pub session_expires_at: DateTime<Utc>,
}

pub struct OAuthFlowUseCase<R, P>
where
    R: TenantStore,
    P: IdentityProvider,
{
    repo: Arc<R>,
    provider: Arc<P>,
    config: Arc<AuthConfig>,
}

impl<R, P> OAuthFlowUseCase<R, P>
where
    R: TenantStore,
    P: IdentityProvider + Sync,
{
    pub fn new(repo: Arc<R>, provider: Arc<P>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            provider,
            config,
        }
    }

    /// Fresh `state` and the provider authorize URL carrying it.
    pub fn initiate(&self) -> AuthResult<OAuthInitiation> {
        let client_id = self.config.client_id()?;
        let redirect_uri = self.config.redirect_uri()?;
        let state = random_token(STATE_BYTES);

        let mut url = Url::parse(&self.config.oauth.authorize_url)
            .map_err(|e| AuthError::Internal(format!("invalid authorize url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.oauth.scopes)
            .append_pair("state", &state);

        Ok(OAuthInitiation {
            state,
            authorize_url: url.into(),
        })
    }

    /// Complete the login.
    ///
    /// Nothing is written unless `state` matches and the provider answers;
    /// a failed callback leaves no user, workspace or session behind.
    pub async fn callback(&self, params: CallbackParams) -> AuthResult<CallbackOutcome> {
        let (code, state, cookie) = match (&params.code, &params.state, &params.state_cookie) {
            (Some(code), Some(state), Some(cookie))
                if !code.is_empty() && !state.is_empty() =>
            {
                (code, state, cookie)
            }
            _ => return Err(AuthError::CsrfMismatch),
        };
        if !constant_time_eq(state.as_bytes(), cookie.as_bytes()) {
            return Err(AuthError::CsrfMismatch);
        }

        let product_id = self.config.target_product()?;
        let credentials = ClientCredentials {
            client_id: self.config.client_id()?,
            client_secret: self.config.client_secret()?,
            redirect_uri: self.config.redirect_uri()?,
        };

        let token = self.provider.exchange_code(&credentials, code).await?;
        let viewer = self.provider.fetch_viewer(&token.access_token).await?;
        let matched = viewer.entitlement(product_id);

        let now = Utc::now();
        let upstream_token_expires_at = token.expires_in.and_then(|secs| {
            Duration::try_seconds(secs).and_then(|lifetime| now.checked_add_signed(lifetime))
        });
        if token.expires_in.is_some() && upstream_token_expires_at.is_none() {
            tracing::warn!(expires_in = ?token.expires_in, "Upstream token lifetime out of range");
        }

        let tenancy = TenantResolver::new(self.repo.clone())
            .reconcile(&viewer, matched, product_id)
            .await?;

        let session_expires_at = now + self.config.session_lifetime();
        let session_token = SessionStore::new(self.repo.clone())
            .create(NewSession {
                user_id: tenancy.user.id,
                workspace_id: tenancy.workspace.id,
                expires_at: session_expires_at,
                upstream_access_token: Some(token.access_token.clone()),
                upstream_token_expires_at,
            })
            .await?;

        let active = tenancy.membership.status.is_active();
        tracing::info!(
            user_id = %tenancy.user.id,
            workspace_id = %tenancy.workspace.id,
            active,
            "OAuth login completed"
        );

        Ok(CallbackOutcome {
            session_token,
            active,
            session_expires_at,
        })
    }
}
