//! Auth Middleware
//!
//! [`edge_gatekeeper`] runs in front of every route: it strips the trusted
//! tenant headers from inbound requests and, on protected paths, verifies
//! the platform token and re-derives those headers from its claims.
//!
//! [`require_access`] sits on the gated routes themselves: principal
//! resolution followed by the access gate.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{OriginalUri, Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode, Uri, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::application::access_gate::{AccessDecision, AccessGate};
use crate::application::config::AuthConfig;
use crate::application::principal::{Credentials, default_resolver};
use crate::application::token_verifier::TokenVerifier;
use crate::domain::repository::TenantStore;
use crate::domain::value_object::platform_claims::VerifiedClaims;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::ErrorBody;

/// Platform token header spellings, in priority order.
const TOKEN_HEADERS: &[&str] = &["x-whop-jwt", "x-whop-auth", "x-whop-token"];

/// Platform token query parameters, in priority order.
const TOKEN_QUERY_PARAMS: &[&str] = &["whop_jwt", "whopJwt", "token"];

/// Where the platform token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cookie,
    Header,
    Bearer,
    Query,
}

/// The platform token carried by a request.
///
/// Trusted cookie first, then the header aliases, then an
/// `Authorization: Bearer` value, then the query parameters.
pub fn carried_token(
    headers: &HeaderMap,
    uri: &Uri,
    config: &AuthConfig,
) -> Option<(String, TokenSource)> {
    if let Some(token) = platform::cookie::extract_cookie(headers, &config.platform_cookie_name) {
        return Some((token, TokenSource::Cookie));
    }

    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    if let Some(token) = TOKEN_HEADERS.iter().find_map(|name| header_value(name)) {
        return Some((token, TokenSource::Header));
    }

    let bearer = header_value(header::AUTHORIZATION.as_str()).and_then(|value| {
        let (scheme, token) = value.split_once(|c: char| c.is_ascii_whitespace())?;
        let token = token.trim();
        (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
    });
    if let Some(token) = bearer {
        return Some((token, TokenSource::Bearer));
    }

    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;
    TOKEN_QUERY_PARAMS
        .iter()
        .find_map(|name| params.get(*name).filter(|v| !v.is_empty()).cloned())
        .map(|token| (token, TokenSource::Query))
}

fn is_api(path: &str) -> bool {
    path.starts_with("/api/")
}

/// 401 JSON for API paths, redirect to the login page otherwise.
fn unauthenticated(path: &str, config: &AuthConfig) -> Response {
    if is_api(path) {
        (StatusCode::UNAUTHORIZED, Json(ErrorBody::UNAUTHORIZED)).into_response()
    } else {
        Redirect::temporary(&config.login_path).into_response()
    }
}

/// 403 JSON for API paths, redirect to the no-access page otherwise.
fn forbidden(path: &str, config: &AuthConfig) -> Response {
    if is_api(path) {
        (StatusCode::FORBIDDEN, Json(ErrorBody::FORBIDDEN)).into_response()
    } else {
        Redirect::temporary(&config.no_access_path).into_response()
    }
}

fn request_path(req: &Request<Body>) -> String {
    req.extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string())
}

/// Write the trusted headers derived from verified claims.
fn insert_trusted_headers(
    headers: &mut HeaderMap,
    config: &AuthConfig,
    claims: &VerifiedClaims,
) -> AuthResult<()> {
    let values = [&claims.company_id, &claims.user_id, &claims.membership_id];
    for (name, value) in config.trusted_headers().into_iter().zip(values) {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AuthError::Internal(format!("trusted header name: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| AuthError::MissingClaims("header-safe claim"))?;
        headers.insert(name, value);
    }
    Ok(())
}

// ============================================================================
// Edge Gatekeeper
// ============================================================================

/// Strip trusted headers everywhere; verify the platform token on
/// protected paths.
pub async fn edge_gatekeeper(
    State(config): State<Arc<AuthConfig>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    for name in config.trusted_headers() {
        req.headers_mut().remove(name);
    }

    let path = request_path(&req);
    if !config.is_protected(&path) {
        return next.run(req).await;
    }

    let Some((token, source)) = carried_token(req.headers(), req.uri(), &config) else {
        if platform::cookie::extract_cookie(req.headers(), &config.session_cookie_name).is_some() {
            // Session strategy decides downstream.
            return next.run(req).await;
        }
        tracing::debug!(path = %path, "No platform token on protected path");
        return unauthenticated(&path, &config);
    };

    let verified = TokenVerifier::from_config(&config).and_then(|verifier| {
        let claims = verifier.verify(&token)?;
        insert_trusted_headers(req.headers_mut(), &config, &claims)?;
        Ok(claims)
    });

    match verified {
        Ok(claims) => {
            tracing::debug!(
                path = %path,
                company_id = %claims.company_id,
                user_id = %claims.user_id,
                ?source,
                "Platform token accepted"
            );
            req.extensions_mut().insert(claims);

            let mut response = next.run(req).await;
            if source != TokenSource::Cookie {
                config
                    .platform_cookie()
                    .append_set(response.headers_mut(), &token);
            }
            response
        }
        Err(e @ (AuthError::Configuration(_) | AuthError::Internal(_))) => e.into_response(),
        Err(e) => {
            e.log();
            let mut response = unauthenticated(&path, &config);
            config.platform_cookie().append_delete(response.headers_mut());
            response
        }
    }
}

// ============================================================================
// Access
// ============================================================================

/// State of [`require_access`].
pub struct AccessState<R>
where
    R: TenantStore,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R: TenantStore> Clone for AccessState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

/// Resolve the principal and require an active membership.
///
/// On success the [`Principal`](crate::domain::Principal) is placed in the
/// request extensions for the handler.
pub async fn require_access<R>(
    State(state): State<AccessState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: TenantStore,
{
    let path = request_path(&req);
    let edge_claims = req.extensions().get::<VerifiedClaims>().cloned();
    let session_token =
        platform::cookie::extract_cookie(req.headers(), &state.config.session_cookie_name);

    let resolver = default_resolver(state.repo.clone(), state.config.clone());
    let resolved = resolver
        .resolve(Credentials {
            edge_claims: edge_claims.as_ref(),
            session_token: session_token.as_deref(),
        })
        .await;

    let principal = match resolved {
        Ok(Some(principal)) => principal,
        Ok(None) => {
            tracing::debug!(path = %path, "No principal");
            return unauthenticated(&path, &state.config);
        }
        Err(e) => return e.into_response(),
    };

    let gate = AccessGate::new(state.repo.clone(), state.config.clone());
    match gate.check(&principal).await {
        Ok(AccessDecision::Granted) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Ok(AccessDecision::Denied) => {
            tracing::debug!(
                path = %path,
                user_id = %principal.user_id,
                workspace_id = %principal.workspace_id,
                "Access denied"
            );
            forbidden(&path, &state.config)
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::default()
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_token_priority() {
        let uri: Uri = "/dashboard?token=from-query".parse().unwrap();
        let all = headers(&[
            ("cookie", "whop_app_jwt=from-cookie"),
            ("x-whop-auth", "from-header"),
            ("authorization", "Bearer from-bearer"),
        ]);
        assert_eq!(
            carried_token(&all, &uri, &config()),
            Some(("from-cookie".into(), TokenSource::Cookie))
        );

        let no_cookie = headers(&[
            ("x-whop-auth", "from-auth"),
            ("x-whop-jwt", "from-jwt"),
            ("authorization", "Bearer from-bearer"),
        ]);
        assert_eq!(
            carried_token(&no_cookie, &uri, &config()),
            Some(("from-jwt".into(), TokenSource::Header))
        );

        let bearer = headers(&[("authorization", "bEaReR  from-bearer ")]);
        assert_eq!(
            carried_token(&bearer, &uri, &config()),
            Some(("from-bearer".into(), TokenSource::Bearer))
        );

        let tabbed = headers(&[("authorization", "Bearer\tfrom-tab")]);
        assert_eq!(
            carried_token(&tabbed, &uri, &config()),
            Some(("from-tab".into(), TokenSource::Bearer))
        );

        assert_eq!(
            carried_token(&HeaderMap::new(), &uri, &config()),
            Some(("from-query".into(), TokenSource::Query))
        );
    }

    #[test]
    fn test_query_aliases_and_absence() {
        let uri: Uri = "/api/payments?token=c&whopJwt=b&whop_jwt=a".parse().unwrap();
        assert_eq!(
            carried_token(&HeaderMap::new(), &uri, &config()).map(|(t, _)| t),
            Some("a".into())
        );

        let basic = headers(&[("authorization", "Basic dXNlcjpwYXNz"), ("x-whop-jwt", " ")]);
        let uri: Uri = "/api/payments?token=".parse().unwrap();
        assert_eq!(carried_token(&basic, &uri, &config()), None);
    }

    #[test]
    fn test_rejection_shapes() {
        let config = config();
        let api = unauthenticated("/api/payments", &config);
        assert_eq!(api.status(), StatusCode::UNAUTHORIZED);

        let page = unauthenticated("/dashboard", &config);
        assert_eq!(page.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(page.headers()[header::LOCATION], "/login");

        let page = forbidden("/dashboard", &config);
        assert_eq!(page.headers()[header::LOCATION], "/no-access");
        assert_eq!(forbidden("/api/seed", &config).status(), StatusCode::FORBIDDEN);
    }
}
