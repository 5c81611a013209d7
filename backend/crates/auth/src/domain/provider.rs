//! Identity Provider Port
//!
//! The OAuth flow talks to the provider only through [`IdentityProvider`].
//! The response-shape tolerance lives here as plain functions over
//! `serde_json::Value`, so it can be tested without a network.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::value_object::membership_status::MembershipStatus;
use crate::error::{AuthError, AuthResult};

/// OAuth client credentials, resolved from configuration per call.
#[derive(Clone)]
pub struct ClientCredentials<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub redirect_uri: &'a str,
}

/// Successful token endpoint response.
#[derive(Clone, Deserialize)]
pub struct ProviderToken {
    pub access_token: String,
    /// Seconds. Any JSON number is accepted; anything else counts as absent.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub expires_in: Option<i64>,
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Number(n)) = value else {
        return Ok(None);
    };
    Ok(n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f.trunc() as i64)
    }))
}

impl std::fmt::Debug for ProviderToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderToken")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessRef {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerMembership {
    pub id: String,
    pub status: MembershipStatus,
    pub product_id: Option<String>,
    pub business: Option<BusinessRef>,
}

/// The signed-in provider account with its memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub memberships: Vec<ViewerMembership>,
}

impl Viewer {
    /// First membership for `product_id` that is active and belongs to a
    /// business.
    pub fn entitlement(&self, product_id: &str) -> Option<&ViewerMembership> {
        self.memberships.iter().find(|m| {
            m.product_id.as_deref() == Some(product_id)
                && m.status.is_active()
                && m.business.is_some()
        })
    }
}

#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Exchange an authorization code at the token endpoint.
    async fn exchange_code(
        &self,
        credentials: &ClientCredentials<'_>,
        code: &str,
    ) -> AuthResult<ProviderToken>;

    /// Fetch the profile, then the memberships, with the access token.
    async fn fetch_viewer(&self, access_token: &str) -> AuthResult<Viewer>;
}

// ============================================================================
// Response parsing
// ============================================================================

const BUSINESS_ID_POINTERS: &[&str] = &["/business/id", "/business_id", "/workspace/id", "/workspace_id"];
const BUSINESS_NAME_POINTERS: &[&str] = &["/business/name", "/workspace/name"];
const PRODUCT_ID_POINTERS: &[&str] = &[
    "/product/id",
    "/product_id",
    "/plan/product/id",
    "/plan/product_id",
    "/plan/product/uuid",
];
const MEMBERSHIP_LIST_POINTERS: &[&str] = &["", "/data", "/data/items", "/data/memberships", "/items", "/memberships"];

/// Non-empty strings and numbers, as a string.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_of(value: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .find_map(|pointer| value.pointer(pointer).and_then(scalar))
}

/// Profile from `GET /me`, optionally wrapped in `data`.
pub fn parse_profile(body: &Value) -> AuthResult<(String, Option<String>, Option<String>)> {
    let me = body.get("data").filter(|d| d.is_object()).unwrap_or(body);
    let id = me
        .get("id")
        .and_then(scalar)
        .ok_or_else(|| AuthError::external(None, "profile response missing id"))?;
    let email = me.get("email").and_then(scalar);
    let name = me.get("name").and_then(scalar);
    Ok((id, email, name))
}

/// Memberships from `GET /memberships`. Entries without an id are dropped.
pub fn parse_memberships(body: &Value) -> Vec<ViewerMembership> {
    let list = MEMBERSHIP_LIST_POINTERS
        .iter()
        .find_map(|pointer| body.pointer(pointer).and_then(Value::as_array));

    let Some(list) = list else {
        return Vec::new();
    };

    list.iter()
        .filter_map(|entry| {
            let id = entry.get("id").and_then(scalar)?;
            let status = entry.get("status").and_then(scalar).unwrap_or_default();
            let business = first_of(entry, BUSINESS_ID_POINTERS).map(|id| BusinessRef {
                id,
                name: first_of(entry, BUSINESS_NAME_POINTERS),
            });
            Some(ViewerMembership {
                id,
                status: MembershipStatus::new(status),
                product_id: first_of(entry, PRODUCT_ID_POINTERS),
                business,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(body: Value) -> ProviderToken {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_token_lifetime_accepts_any_number() {
        assert_eq!(token(json!({"access_token": "t", "expires_in": 3600})).expires_in, Some(3600));
        assert_eq!(token(json!({"access_token": "t", "expires_in": 3600.0})).expires_in, Some(3600));
        assert_eq!(token(json!({"access_token": "t", "expires_in": 59.9})).expires_in, Some(59));
        assert_eq!(token(json!({"access_token": "t", "expires_in": 1e300})).expires_in, None);
        assert_eq!(token(json!({"access_token": "t", "expires_in": "3600"})).expires_in, None);
        assert_eq!(token(json!({"access_token": "t", "expires_in": null})).expires_in, None);
        assert_eq!(token(json!({"access_token": "t"})).expires_in, None);
    }

    #[test]
    fn test_profile_plain_and_wrapped() {
        let plain = json!({"id": "user_1", "email": "a@b.c", "name": "Ann"});
        let wrapped = json!({"data": plain.clone()});
        for body in [plain, wrapped] {
            let (id, email, name) = parse_profile(&body).unwrap();
            assert_eq!(id, "user_1");
            assert_eq!(email.as_deref(), Some("a@b.c"));
            assert_eq!(name.as_deref(), Some("Ann"));
        }
    }

    #[test]
    fn test_profile_numeric_id_and_missing_fields() {
        let (id, email, name) = parse_profile(&json!({"id": 42, "email": null})).unwrap();
        assert_eq!(id, "42");
        assert_eq!(email, None);
        assert_eq!(name, None);
    }

    #[test]
    fn test_profile_without_id_is_external_error() {
        let err = parse_profile(&json!({"data": {"email": "a@b.c"}})).unwrap_err();
        assert!(matches!(err, AuthError::ExternalAuth { .. }));
        assert!(parse_profile(&json!({"id": ""})).is_err());
    }

    #[test]
    fn test_membership_list_shapes() {
        let entry = json!({"id": "mem_1", "status": "active", "product_id": "prod_1"});
        let shapes = [
            json!([entry.clone()]),
            json!({"data": [entry.clone()]}),
            json!({"data": {"items": [entry.clone()]}}),
            json!({"data": {"memberships": [entry.clone()]}}),
            json!({"items": [entry.clone()]}),
            json!({"memberships": [entry.clone()]}),
        ];
        for body in shapes {
            let parsed = parse_memberships(&body);
            assert_eq!(parsed.len(), 1, "{body}");
            assert_eq!(parsed[0].id, "mem_1");
        }
        assert!(parse_memberships(&json!({"data": "nope"})).is_empty());
    }

    #[test]
    fn test_membership_aliases() {
        let body = json!([
            {"id": "m1", "status": "active", "business": {"id": "biz_1", "name": "Acme"}, "product": {"id": "p1"}},
            {"id": "m2", "status": "active", "workspace_id": "biz_2", "plan": {"product": {"uuid": "p2"}}},
            {"id": "m3", "status": "active", "workspace": {"id": 7, "name": "Seven"}, "plan": {"product_id": "p3"}},
            {"status": "active", "business_id": "biz_x"},
        ]);
        let parsed = parse_memberships(&body);
        assert_eq!(parsed.len(), 3);

        assert_eq!(
            parsed[0].business,
            Some(BusinessRef { id: "biz_1".into(), name: Some("Acme".into()) })
        );
        assert_eq!(parsed[0].product_id.as_deref(), Some("p1"));

        assert_eq!(parsed[1].business.as_ref().map(|b| b.id.as_str()), Some("biz_2"));
        assert_eq!(parsed[1].business.as_ref().and_then(|b| b.name.clone()), None);
        assert_eq!(parsed[1].product_id.as_deref(), Some("p2"));

        assert_eq!(parsed[2].business.as_ref().map(|b| b.id.as_str()), Some("7"));
        assert_eq!(parsed[2].product_id.as_deref(), Some("p3"));
    }

    fn membership(product: &str, status: &str, business: Option<&str>) -> ViewerMembership {
        ViewerMembership {
            id: format!("mem_{product}_{status}"),
            status: MembershipStatus::new(status),
            product_id: Some(product.to_string()),
            business: business.map(|id| BusinessRef { id: id.into(), name: None }),
        }
    }

    #[test]
    fn test_entitlement_requires_product_status_and_business() {
        let viewer = Viewer {
            id: "user_1".into(),
            email: None,
            name: None,
            memberships: vec![
                membership("other", "active", Some("biz_0")),
                membership("prod", "canceled", Some("biz_1")),
                membership("prod", "active", None),
                membership("prod", " ACTIVE ", Some("biz_2")),
                membership("prod", "active", Some("biz_3")),
            ],
        };
        let matched = viewer.entitlement("prod").unwrap();
        assert_eq!(matched.business.as_ref().unwrap().id, "biz_2");
        assert!(viewer.entitlement("missing").is_none());
    }
}
