//! Cookie Management Infrastructure
//!
//! Just enough cookie handling for opaque tokens: read one value out of a
//! `Cookie` header, and build `Set-Cookie` values to write or clear it.

use axum::http::{HeaderMap, HeaderValue, header};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

const EXPIRED: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Attributes of one named cookie.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    /// `None` makes a browser-session cookie.
    pub max_age_secs: Option<i64>,
}

impl CookieConfig {
    /// HttpOnly, SameSite=Lax, `Path=/`.
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        Self {
            name: name.into(),
            secure,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age_secs: None,
        }
    }

    pub fn with_max_age(mut self, secs: i64) -> Self {
        self.max_age_secs = Some(secs);
        self
    }

    fn attributes(&self) -> String {
        let mut attrs = String::new();
        if self.http_only {
            attrs.push_str("; HttpOnly");
        }
        if self.secure {
            attrs.push_str("; Secure");
        }
        attrs.push_str(&format!("; SameSite={}", self.same_site.as_str()));
        attrs.push_str(&format!("; Path={}", self.path));
        attrs
    }

    /// Build Set-Cookie header value
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut cookie = format!("{}={}{}", self.name, value, self.attributes());
        if let Some(max_age) = self.max_age_secs {
            cookie.push_str(&format!("; Max-Age={}", max_age));
        }
        cookie
    }

    /// Build an already-expired Set-Cookie that makes the browser drop it.
    ///
    /// Attributes match [`Self::build_set_cookie`] so the browser matches
    /// the original cookie.
    pub fn build_delete_cookie(&self) -> String {
        format!(
            "{}={}; Max-Age=0; Expires={}",
            self.name,
            self.attributes(),
            EXPIRED
        )
    }

    /// Append `Set-Cookie: name=value` to `headers`.
    pub fn append_set(&self, headers: &mut HeaderMap, value: &str) {
        append(headers, &self.build_set_cookie(value));
    }

    /// Append the clearing `Set-Cookie` to `headers`.
    pub fn append_delete(&self, headers: &mut HeaderMap) {
        append(headers, &self.build_delete_cookie());
    }
}

fn append(headers: &mut HeaderMap, cookie: &str) {
    // Values are base64url tokens or JWTs; anything else is dropped.
    if let Ok(value) = HeaderValue::from_str(cookie) {
        headers.append(header::SET_COOKIE, value);
    }
}

/// Extract a non-empty cookie value from the `Cookie` headers.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}
