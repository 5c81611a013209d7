//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, OriginalUri, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

use crate::application::config::AuthConfig;
use crate::application::{
    AccessGate, CallbackParams, Credentials, OAuthFlowUseCase, SessionStore, TokenVerifier,
    default_resolver,
};
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::TenantStore;
use crate::domain::value_object::platform_claims::VerifiedClaims;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{OAuthCallbackQuery, SessionStatusResponse};
use crate::presentation::middleware::carried_token;

/// Shared state for auth handlers
pub struct AuthAppState<R, P>
where
    R: TenantStore,
    P: IdentityProvider + Sync + 'static,
{
    pub repo: Arc<R>,
    pub provider: Arc<P>,
    pub config: Arc<AuthConfig>,
}

impl<R, P> Clone for AuthAppState<R, P>
where
    R: TenantStore,
    P: IdentityProvider + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            provider: self.provider.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R, P> AuthAppState<R, P>
where
    R: TenantStore,
    P: IdentityProvider + Sync + 'static,
{
    pub fn new(repo: R, provider: P, config: AuthConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            provider: Arc::new(provider),
            config: Arc::new(config),
        }
    }

    fn oauth_flow(&self) -> OAuthFlowUseCase<R, P> {
        OAuthFlowUseCase::new(self.repo.clone(), self.provider.clone(), self.config.clone())
    }
}

// ============================================================================
// OAuth
// ============================================================================

/// GET /api/auth/oauth
pub async fn oauth_start<R, P>(State(state): State<AuthAppState<R, P>>) -> AuthResult<Response>
where
    R: TenantStore,
    P: IdentityProvider + Sync + 'static,
{
    let initiation = state.oauth_flow().initiate()?;

    let mut response = Redirect::temporary(&initiation.authorize_url).into_response();
    state
        .config
        .state_cookie()
        .append_set(response.headers_mut(), &initiation.state);

    Ok(response)
}

/// GET /api/auth/oauth/callback
pub async fn oauth_callback<R, P>(
    State(state): State<AuthAppState<R, P>>,
    headers: HeaderMap,
    Query(query): Query<OAuthCallbackQuery>,
) -> Response
where
    R: TenantStore,
    P: IdentityProvider + Sync + 'static,
{
    let config = &state.config;

    if let Some(error) = &query.error {
        tracing::info!(error = %error, "Provider returned an OAuth error");
    }

    let params = CallbackParams {
        code: query.code,
        state: query.state,
        state_cookie: platform::cookie::extract_cookie(&headers, &config.state_cookie_name),
    };

    let mut response = match state.oauth_flow().callback(params).await {
        Ok(outcome) => {
            let target = if outcome.active {
                &config.dashboard_path
            } else {
                &config.no_access_path
            };
            let mut response = Redirect::temporary(target).into_response();
            config
                .session_cookie()
                .append_set(response.headers_mut(), outcome.session_token.expose());
            response
        }
        Err(AuthError::CsrfMismatch) => {
            AuthError::CsrfMismatch.log();
            Redirect::temporary(&config.login_path).into_response()
        }
        Err(e) => e.into_response(),
    };

    config.state_cookie().append_delete(response.headers_mut());
    response
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
///
/// Always 204. Store failures are logged; the cookie is cleared anyway.
pub async fn logout<R, P>(
    State(state): State<AuthAppState<R, P>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    R: TenantStore,
    P: IdentityProvider + Sync + 'static,
{
    if let Some(token) = platform::cookie::extract_cookie(&headers, &state.config.session_cookie_name)
    {
        if let Err(e) = SessionStore::new(state.repo.clone()).destroy(&token).await {
            e.log();
        }
    }

    let mut headers = HeaderMap::new();
    state.config.session_cookie().append_delete(&mut headers);
    (StatusCode::NO_CONTENT, headers)
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/auth/status
///
/// The path is not gated, so a carried platform token is verified here.
/// An invalid one is ignored.
pub async fn session_status<R, P>(
    State(state): State<AuthAppState<R, P>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    gated_claims: Option<Extension<VerifiedClaims>>,
) -> AuthResult<Json<SessionStatusResponse>>
where
    R: TenantStore,
    P: IdentityProvider + Sync + 'static,
{
    let config = &state.config;

    let edge_claims = match gated_claims {
        Some(Extension(claims)) => Some(claims),
        None => carried_token(&headers, &uri, config).and_then(|(token, _)| {
            TokenVerifier::from_config(config)
                .and_then(|verifier| verifier.verify(&token))
                .ok()
        }),
    };
    let session_token = platform::cookie::extract_cookie(&headers, &config.session_cookie_name);

    let principal = default_resolver(state.repo.clone(), config.clone())
        .resolve(Credentials {
            edge_claims: edge_claims.as_ref(),
            session_token: session_token.as_deref(),
        })
        .await?;

    let Some(principal) = principal else {
        return Ok(Json(SessionStatusResponse::anonymous()));
    };

    let access = AccessGate::new(state.repo.clone(), config.clone())
        .check(&principal)
        .await?
        .is_granted();

    Ok(Json(SessionStatusResponse {
        authenticated: true,
        scheme: Some(principal.scheme.as_str()),
        user_id: Some(principal.user_id.to_string()),
        workspace_id: Some(principal.workspace_id.to_string()),
        access,
    }))
}
