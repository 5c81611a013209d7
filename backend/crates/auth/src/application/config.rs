//! Application Configuration
//!
//! Secrets are `Option`s: the server starts without them and the request
//! that needs one fails with [`AuthError::Configuration`].

use std::time::Duration;

use platform::cookie::CookieConfig;
pub use platform::cookie::SameSite;

use crate::error::{AuthError, AuthResult};

/// Path pattern guarded by the edge gatekeeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Exactly this path.
    Exact(String),
    /// This path and everything below it (`/dashboard`, `/dashboard/x`).
    Prefix(String),
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => path == p,
            PathPattern::Prefix(p) => {
                path == p
                    || path
                        .strip_prefix(p.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

/// OAuth client and provider endpoints.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub authorize_url: String,
    pub token_url: String,
    /// Base for `/me` and `/memberships`.
    pub api_base_url: String,
    pub scopes: String,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            authorize_url: "https://whop.com/oauth/authorize".to_string(),
            token_url: "https://whop.com/oauth/token".to_string(),
            api_base_url: "https://api.whop.com/api/v2".to_string(),
            scopes: "identify email memberships businesses".to_string(),
        }
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret of platform-signed tokens.
    pub platform_token_secret: Option<String>,
    /// Product whose membership grants dashboard access.
    pub product_id: Option<String>,
    pub oauth: OAuthSettings,

    pub platform_cookie_name: String,
    pub session_cookie_name: String,
    pub state_cookie_name: String,
    /// Whether to set the Secure attribute on cookies.
    pub cookie_secure: bool,
    pub session_ttl: Duration,
    pub state_ttl: Duration,
    /// Upper bound on each identity-provider request.
    pub provider_timeout: Duration,

    pub company_id_header: String,
    pub user_id_header: String,
    pub membership_id_header: String,
    pub protected_paths: Vec<PathPattern>,

    pub login_path: String,
    pub no_access_path: String,
    pub dashboard_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            platform_token_secret: None,
            product_id: None,
            oauth: OAuthSettings::default(),
            platform_cookie_name: "whop_app_jwt".to_string(),
            session_cookie_name: "sc_session".to_string(),
            state_cookie_name: "sc_oauth_state".to_string(),
            cookie_secure: true,
            session_ttl: Duration::from_secs(30 * 24 * 3600), // 30 days
            state_ttl: Duration::from_secs(10 * 60),          // 10 minutes
            provider_timeout: platform::http::DEFAULT_TIMEOUT,
            company_id_header: "x-sc-company-id".to_string(),
            user_id_header: "x-sc-user-id".to_string(),
            membership_id_header: "x-sc-membership-id".to_string(),
            protected_paths: vec![
                PathPattern::Prefix("/dashboard".to_string()),
                PathPattern::Prefix("/api/payments".to_string()),
                PathPattern::Exact("/api/seed".to_string()),
            ],
            login_path: "/login".to_string(),
            no_access_path: "/no-access".to_string(),
            dashboard_path: "/dashboard".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::default()
        }
    }

    /// Overlay settings found through `lookup` (normally `std::env::var`).
    ///
    /// Empty values count as unset.
    pub fn with_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        self.platform_token_secret = get("PLATFORM_TOKEN_SECRET").or(self.platform_token_secret);
        self.product_id = get("PRODUCT_ID").or(self.product_id);
        self.oauth.client_id = get("OAUTH_CLIENT_ID").or(self.oauth.client_id);
        self.oauth.client_secret = get("OAUTH_CLIENT_SECRET").or(self.oauth.client_secret);
        self.oauth.redirect_uri = get("OAUTH_REDIRECT_URI").or(self.oauth.redirect_uri);
        if let Some(url) = get("OAUTH_AUTHORIZE_URL") {
            self.oauth.authorize_url = url;
        }
        if let Some(url) = get("OAUTH_TOKEN_URL") {
            self.oauth.token_url = url;
        }
        if let Some(url) = get("PROVIDER_API_URL") {
            self.oauth.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(scopes) = get("OAUTH_SCOPES") {
            self.oauth.scopes = scopes;
        }
        if get("APP_ENV").as_deref() == Some("production") {
            self.cookie_secure = true;
        }
        self
    }

    // ========================================================================
    // Required settings
    // ========================================================================

    pub fn platform_secret(&self) -> AuthResult<&str> {
        self.platform_token_secret
            .as_deref()
            .ok_or(AuthError::Configuration("PLATFORM_TOKEN_SECRET"))
    }

    pub fn target_product(&self) -> AuthResult<&str> {
        self.product_id
            .as_deref()
            .ok_or(AuthError::Configuration("PRODUCT_ID"))
    }

    pub fn client_id(&self) -> AuthResult<&str> {
        self.oauth
            .client_id
            .as_deref()
            .ok_or(AuthError::Configuration("OAUTH_CLIENT_ID"))
    }

    pub fn client_secret(&self) -> AuthResult<&str> {
        self.oauth
            .client_secret
            .as_deref()
            .ok_or(AuthError::Configuration("OAUTH_CLIENT_SECRET"))
    }

    pub fn redirect_uri(&self) -> AuthResult<&str> {
        self.oauth
            .redirect_uri
            .as_deref()
            .ok_or(AuthError::Configuration("OAUTH_REDIRECT_URI"))
    }

    // ========================================================================
    // Cookies
    // ========================================================================

    /// Trusted platform-token cookie. No Max-Age: lives until replaced.
    pub fn platform_cookie(&self) -> CookieConfig {
        CookieConfig::new(&self.platform_cookie_name, self.cookie_secure)
    }

    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig::new(&self.session_cookie_name, self.cookie_secure)
            .with_max_age(self.session_ttl.as_secs() as i64)
    }

    pub fn state_cookie(&self) -> CookieConfig {
        CookieConfig::new(&self.state_cookie_name, self.cookie_secure)
            .with_max_age(self.state_ttl.as_secs() as i64)
    }

    pub fn session_lifetime(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.session_ttl).unwrap_or(chrono::Duration::days(30))
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_paths.iter().any(|p| p.matches(path))
    }

    /// The three headers only the gatekeeper may set.
    pub fn trusted_headers(&self) -> [&str; 3] {
        [
            self.company_id_header.as_str(),
            self.user_id_header.as_str(),
            self.membership_id_header.as_str(),
        ]
    }
}
