//! HTTP Identity Provider
//!
//! `reqwest` client for the token endpoint and the `/me` and
//! `/memberships` API calls. Any non-2xx answer, transport failure or
//! unusable body becomes [`AuthError::ExternalAuth`].

use reqwest::{Client, Response};
use serde_json::Value;

use crate::application::config::AuthConfig;
use crate::domain::provider::{
    ClientCredentials, IdentityProvider, ProviderToken, Viewer, parse_memberships, parse_profile,
};
use crate::error::{AuthError, AuthResult};

#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    token_url: String,
    api_base_url: String,
}

impl HttpIdentityProvider {
    pub fn new(client: Client, token_url: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        let client = platform::http::build_client(config.provider_timeout)
            .map_err(|e| AuthError::Internal(format!("http client: {e}")))?;
        Ok(Self::new(
            client,
            config.oauth.token_url.clone(),
            config.oauth.api_base_url.clone(),
        ))
    }

    async fn get_json(&self, path: &str, access_token: &str) -> AuthResult<Value> {
        let url = format!("{}{}", self.api_base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }
}

fn transport_error(e: reqwest::Error) -> AuthError {
    AuthError::external(e.status().map(|s| s.as_u16()), e.to_string())
}

/// 2xx body as JSON, anything else as `ExternalAuth` with the raw body.
async fn read_json(response: Response) -> AuthResult<Value> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    if !status.is_success() {
        return Err(AuthError::external(Some(status.as_u16()), body));
    }
    serde_json::from_str(&body)
        .map_err(|e| AuthError::external(Some(status.as_u16()), format!("invalid JSON: {e}")))
}

impl IdentityProvider for HttpIdentityProvider {
    async fn exchange_code(
        &self,
        credentials: &ClientCredentials<'_>,
        code: &str,
    ) -> AuthResult<ProviderToken> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", credentials.client_id),
            ("client_secret", credentials.client_secret),
            ("redirect_uri", credentials.redirect_uri),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = read_json(response).await?;

        let token: ProviderToken = serde_json::from_value(body)
            .map_err(|e| AuthError::external(Some(status), format!("token response: {e}")))?;
        if token.access_token.is_empty() {
            return Err(AuthError::external(Some(status), "empty access_token"));
        }

        tracing::debug!(expires_in = ?token.expires_in, "Authorization code exchanged");
        Ok(token)
    }

    async fn fetch_viewer(&self, access_token: &str) -> AuthResult<Viewer> {
        let me = self.get_json("/me", access_token).await?;
        let (id, email, name) = parse_profile(&me)?;

        let memberships = self.get_json("/memberships", access_token).await?;
        let memberships = parse_memberships(&memberships);

        tracing::debug!(viewer = %id, memberships = memberships.len(), "Viewer fetched");

        Ok(Viewer {
            id,
            email,
            name,
            memberships,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_trims_base_url() {
        let mut config = AuthConfig::default();
        config.oauth.api_base_url = "http://localhost:9000/api/".into();
        let provider = HttpIdentityProvider::from_config(&config).unwrap();
        assert_eq!(provider.api_base_url, "http://localhost:9000/api");
        assert_eq!(provider.token_url, "https://whop.com/oauth/token");
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_external_error() {
        let client = platform::http::build_client(std::time::Duration::from_millis(500)).unwrap();
        // Port 9 (discard) on loopback: nothing listens.
        let provider = HttpIdentityProvider::new(client, "http://127.0.0.1:9/token", "http://127.0.0.1:9");
        let credentials = ClientCredentials {
            client_id: "id",
            client_secret: "secret",
            redirect_uri: "http://localhost/cb",
        };

        let err = provider.exchange_code(&credentials, "code").await.unwrap_err();
        assert!(matches!(err, AuthError::ExternalAuth { status: None, .. }));

        let err = provider.fetch_viewer("token").await.unwrap_err();
        assert!(matches!(err, AuthError::ExternalAuth { .. }));
    }
}
