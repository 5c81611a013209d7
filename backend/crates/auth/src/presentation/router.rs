//! Auth Router

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::application::config::AuthConfig;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::TenantStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AccessState, edge_gatekeeper, require_access};

/// OAuth, logout and status routes, to be nested under `/api/auth`.
pub fn auth_router<R, P>(state: AuthAppState<R, P>) -> Router
where
    R: TenantStore,
    P: IdentityProvider + Sync + 'static,
{
    Router::new()
        .route("/oauth", get(handlers::oauth_start::<R, P>))
        .route("/oauth/callback", get(handlers::oauth_callback::<R, P>))
        .route("/logout", post(handlers::logout::<R, P>))
        .route("/status", get(handlers::session_status::<R, P>))
        .with_state(state)
}

/// Put every route of `router` behind principal resolution and the
/// access gate.
pub fn require_access_on<R>(router: Router, state: AccessState<R>) -> Router
where
    R: TenantStore,
{
    router.route_layer(middleware::from_fn_with_state(state, require_access::<R>))
}

/// Wrap the whole application in the edge gatekeeper.
pub fn with_edge_gatekeeper(router: Router, config: Arc<AuthConfig>) -> Router {
    router.layer(middleware::from_fn_with_state(config, edge_gatekeeper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::oauth_flow::tests::{FakeProvider, config as oauth_config, entitled_viewer};
    use crate::application::token_verifier::tests::{SECRET, sign};
    use crate::domain::entity::principal::Principal;
    use crate::domain::value_object::membership_status::MembershipStatus;
    use crate::infra::memory::InMemoryAuthRepository;
    use axum::body::{Body, to_bytes};
    use axum::extract::Extension;
    use axum::http::{HeaderMap, Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn config() -> AuthConfig {
        let mut config = oauth_config();
        config.platform_token_secret = Some(SECRET.into());
        config
    }

    fn app_with(repo: &InMemoryAuthRepository, provider: FakeProvider, config: AuthConfig) -> Router {
        let config = Arc::new(config);
        let state = AuthAppState {
            repo: Arc::new(repo.clone()),
            provider: Arc::new(provider),
            config: config.clone(),
        };

        let gated = Router::new()
            .route(
                "/api/payments",
                get(|Extension(p): Extension<Principal>| async move { p.scheme.as_str() }),
            )
            .route(
                "/api/payments/headers",
                get(|headers: HeaderMap| async move {
                    headers
                        .get("x-sc-company-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("none")
                        .to_string()
                }),
            )
            .route("/dashboard", get(|| async { "dashboard" }));
        let gated = require_access_on(
            gated,
            AccessState {
                repo: state.repo.clone(),
                config: config.clone(),
            },
        );

        let open = Router::new().route(
            "/echo",
            get(|headers: HeaderMap| async move { headers.contains_key("x-sc-user-id").to_string() }),
        );

        let app = Router::new()
            .nest("/api/auth", auth_router(state))
            .merge(gated)
            .merge(open);
        with_edge_gatekeeper(app, config)
    }

    fn app(repo: &InMemoryAuthRepository, viewer_active: bool) -> Router {
        let mut viewer = entitled_viewer();
        if !viewer_active {
            viewer.memberships[0].status = MembershipStatus::new("canceled");
        }
        app_with(repo, FakeProvider::with_viewer(viewer), config())
    }

    fn get_req(uri: &str, headers: &[(&'static str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn set_cookies(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    fn edge_token() -> String {
        sign(&json!({"company_id": "biz_1", "user_id": "user_1", "membership_id": "mem_1"}))
    }

    /// Run the abc123/validcode callback and return the `name=value` pair
    /// of the session cookie plus the redirect target.
    async fn login(app: &Router) -> (String, String) {
        let response = app
            .clone()
            .oneshot(get_req(
                "/api/auth/oauth/callback?code=validcode&state=abc123",
                &[("cookie", "sc_oauth_state=abc123")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

        let cookies = set_cookies(&response);
        assert!(
            cookies
                .iter()
                .any(|c| c.starts_with("sc_oauth_state=;") && c.contains("Max-Age=0")),
            "{cookies:?}"
        );
        let session = cookies
            .iter()
            .find(|c| c.starts_with("sc_session=") && !c.starts_with("sc_session=;"))
            .expect("session cookie");
        assert!(session.contains("Max-Age=2592000"));
        assert!(session.contains("HttpOnly"));

        let pair = session.split(';').next().unwrap().to_string();
        (pair, location(&response).to_string())
    }

    // ========================================================================
    // Edge Gatekeeper
    // ========================================================================

    #[tokio::test]
    async fn test_protected_api_without_token_is_exact_401() {
        let repo = InMemoryAuthRepository::new();
        let response = app(&repo, true)
            .oneshot(get_req("/api/payments", &[]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_string(response).await, r#"{"error":"Unauthorized"}"#);
    }

    #[tokio::test]
    async fn test_protected_page_without_token_redirects_to_login() {
        let repo = InMemoryAuthRepository::new();
        let response = app(&repo, true)
            .oneshot(get_req("/dashboard", &[]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_bearer_token_derives_headers_and_sets_cookie() {
        let repo = InMemoryAuthRepository::new();
        let token = edge_token();
        let auth = format!("Bearer {token}");
        let response = app(&repo, true)
            .oneshot(get_req(
                "/api/payments/headers",
                &[("authorization", auth.as_str()), ("x-sc-company-id", "biz_evil")],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookies = set_cookies(&response);
        assert!(cookies.iter().any(|c| c.starts_with(&format!("whop_app_jwt={token};"))));
        assert_eq!(body_string(response).await, "biz_1");
        assert_eq!(repo.counts().await, (1, 1, 1));
    }

    #[tokio::test]
    async fn test_cookie_token_is_not_reissued() {
        let repo = InMemoryAuthRepository::new();
        let cookie = format!("whop_app_jwt={}", edge_token());
        let response = app(&repo, true)
            .oneshot(get_req("/api/payments", &[("cookie", cookie.as_str())]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(set_cookies(&response).is_empty());
        assert_eq!(body_string(response).await, "edge");
    }

    #[tokio::test]
    async fn test_spoofed_headers_stripped_on_open_paths() {
        let repo = InMemoryAuthRepository::new();
        let response = app(&repo, true)
            .oneshot(get_req("/echo", &[("x-sc-user-id", "user_admin")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "false");
    }

    #[tokio::test]
    async fn test_invalid_token_clears_cookie() {
        let repo = InMemoryAuthRepository::new();
        let app = app(&repo, true);

        let response = app
            .clone()
            .oneshot(get_req("/dashboard", &[("cookie", "whop_app_jwt=garbage")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/login");
        assert!(
            set_cookies(&response)
                .iter()
                .any(|c| c.starts_with("whop_app_jwt=;") && c.contains("Max-Age=0"))
        );

        let missing_claim = sign(&json!({"company_id": "biz_1", "user_id": "user_1"}));
        let response = app
            .oneshot(get_req("/api/payments", &[("x-whop-token", missing_claim.as_str())]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_string(response).await, r#"{"error":"Unauthorized"}"#);
        assert_eq!(repo.counts().await, (0, 0, 0));
    }

    #[tokio::test]
    async fn test_missing_platform_secret_is_500() {
        let repo = InMemoryAuthRepository::new();
        let mut config = config();
        config.platform_token_secret = None;
        let response = app_with(&repo, FakeProvider::default(), config)
            .oneshot(get_req("/api/payments?token=abc", &[]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body_string(response).await.contains("PLATFORM_TOKEN_SECRET"));
    }

    // ========================================================================
    // OAuth
    // ========================================================================

    #[tokio::test]
    async fn test_oauth_start_redirects_with_state_cookie() {
        let repo = InMemoryAuthRepository::new();
        let response = app(&repo, true)
            .oneshot(get_req("/api/auth/oauth", &[]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert!(location(&response).starts_with("https://whop.com/oauth/authorize?"));
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("sc_oauth_state="));
        assert!(cookies[0].contains("Max-Age=600"));
        assert!(!cookies[0].contains("Secure"));
    }

    #[tokio::test]
    async fn test_active_login_reaches_dashboard_then_logout() {
        let repo = InMemoryAuthRepository::new();
        let app = app(&repo, true);

        let (session, target) = login(&app).await;
        assert_eq!(target, "/dashboard");

        let response = app
            .clone()
            .oneshot(get_req("/api/payments", &[("cookie", session.as_str())]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "session");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/logout")
                    .header("cookie", &session)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cookies = set_cookies(&response);
        assert!(cookies[0].starts_with("sc_session=;"));
        assert!(cookies[0].contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        assert!(repo.sessions().await.is_empty());

        let response = app
            .oneshot(get_req("/api/payments", &[("cookie", session.as_str())]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_inactive_login_lands_on_no_access() {
        let repo = InMemoryAuthRepository::new();
        let app = app(&repo, false);

        let (session, target) = login(&app).await;
        assert_eq!(target, "/no-access");

        let response = app
            .clone()
            .oneshot(get_req("/api/payments", &[("cookie", session.as_str())]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_string(response).await, r#"{"error":"Forbidden"}"#);

        let response = app
            .oneshot(get_req("/dashboard", &[("cookie", session.as_str())]))
            .await
            .unwrap();
        assert_eq!(location(&response), "/no-access");
    }

    #[tokio::test]
    async fn test_callback_state_mismatch_redirects_to_login() {
        let repo = InMemoryAuthRepository::new();
        let response = app(&repo, true)
            .oneshot(get_req(
                "/api/auth/oauth/callback?code=validcode&state=abc123",
                &[("cookie", "sc_oauth_state=xyz789")],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/login");
        assert!(set_cookies(&response).iter().all(|c| !c.starts_with("sc_session=")));
        assert_eq!(repo.counts().await, (0, 0, 0));
        assert!(repo.sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_callback_provider_failure_is_502() {
        let repo = InMemoryAuthRepository::new();
        let provider = FakeProvider {
            viewer: Some(entitled_viewer()),
            fail_exchange: true,
            ..FakeProvider::default()
        };
        let response = app_with(&repo, provider, config())
            .oneshot(get_req(
                "/api/auth/oauth/callback?code=bad&state=s",
                &[("cookie", "sc_oauth_state=s")],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(!body_string(response).await.contains("invalid_grant"));
        assert_eq!(repo.counts().await, (0, 0, 0));
    }

    // ========================================================================
    // Status
    // ========================================================================

    #[tokio::test]
    async fn test_status_by_scheme() {
        let repo = InMemoryAuthRepository::new();
        let app = app(&repo, true);

        let response = app
            .clone()
            .oneshot(get_req("/api/auth/status", &[]))
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["authenticated"], false);
        assert_eq!(body["access"], false);

        let (session, _) = login(&app).await;
        let response = app
            .clone()
            .oneshot(get_req("/api/auth/status", &[("cookie", session.as_str())]))
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["scheme"], "session");
        assert_eq!(body["access"], true);
        assert!(body["workspaceId"].is_string());

        let auth = format!("Bearer {}", edge_token());
        let response = app
            .oneshot(get_req("/api/auth/status", &[("authorization", auth.as_str())]))
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["scheme"], "edge");
        assert_eq!(body["access"], true);
    }
}
