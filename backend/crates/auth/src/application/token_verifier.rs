//! Token Verifier
//!
//! Checks the HMAC signature of a platform-signed token and pulls out
//! the company, user and membership ids. The issuer has renamed these
//! fields over time, so each logical claim is looked up through an
//! ordered alias list; adding a spelling is a change to one of the
//! `ClaimAliases` constants below.
//!
//! Pure: no I/O, no clock beyond `exp`/`nbf` validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::application::config::AuthConfig;
use crate::domain::value_object::platform_claims::VerifiedClaims;
use crate::error::{AuthError, AuthResult};

/// One logical claim and the field names it may appear under.
pub struct ClaimAliases {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

pub const COMPANY_ID: ClaimAliases = ClaimAliases {
    name: "company id",
    aliases: &["company_id", "companyId", "company"],
};

pub const USER_ID: ClaimAliases = ClaimAliases {
    name: "user id",
    aliases: &["user_id", "userId", "user"],
};

pub const MEMBERSHIP_ID: ClaimAliases = ClaimAliases {
    name: "membership id",
    aliases: &["membership_id", "membershipId", "membership", "access_id"],
};

impl ClaimAliases {
    /// First alias holding a non-empty string.
    pub fn resolve(&self, claims: &Map<String, Value>) -> Option<String> {
        self.aliases.iter().find_map(|alias| match claims.get(*alias) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
    }

    fn require(&self, claims: &Map<String, Value>) -> AuthResult<String> {
        self.resolve(claims).ok_or(AuthError::MissingClaims(self.name))
    }
}

pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // `exp`/`nbf` are checked when present, never required.
        validation.required_spec_claims.clear();
        validation.validate_nbf = true;
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        Ok(Self::new(config.platform_secret()?))
    }

    pub fn verify(&self, token: &str) -> AuthResult<VerifiedClaims> {
        let data = jsonwebtoken::decode::<Map<String, Value>>(token, &self.key, &self.validation)
            .map_err(AuthError::TokenVerification)?;
        let claims = data.claims;

        Ok(VerifiedClaims {
            company_id: COMPANY_ID.require(&claims)?,
            user_id: USER_ID.require(&claims)?,
            membership_id: MEMBERSHIP_ID.require(&claims)?,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    pub(crate) const SECRET: &str = "platform-test-secret";

    pub(crate) fn sign_with(secret: &str, alg: Algorithm, claims: &Value) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    pub(crate) fn sign(claims: &Value) -> String {
        sign_with(SECRET, Algorithm::HS256, claims)
    }

    fn expected() -> VerifiedClaims {
        VerifiedClaims {
            company_id: "biz_1".into(),
            user_id: "user_1".into(),
            membership_id: "mem_1".into(),
        }
    }

    #[test]
    fn test_every_alias_spelling_yields_same_claims() {
        let verifier = TokenVerifier::new(SECRET);
        for company in COMPANY_ID.aliases {
            for user in USER_ID.aliases {
                for membership in MEMBERSHIP_ID.aliases {
                    let mut claims = Map::new();
                    claims.insert(company.to_string(), json!("biz_1"));
                    claims.insert(user.to_string(), json!("user_1"));
                    claims.insert(membership.to_string(), json!("mem_1"));
                    let token = sign(&Value::Object(claims));
                    assert_eq!(verifier.verify(&token).unwrap(), expected());
                }
            }
        }
    }

    #[test]
    fn test_missing_any_claim_fails() {
        let verifier = TokenVerifier::new(SECRET);
        let full = json!({"company_id": "biz_1", "user_id": "user_1", "membership_id": "mem_1"});

        for (dropped, claim) in [("company_id", &COMPANY_ID), ("user_id", &USER_ID), ("membership_id", &MEMBERSHIP_ID)] {
            let mut claims = full.as_object().unwrap().clone();
            claims.remove(dropped);
            let err = verifier.verify(&sign(&Value::Object(claims))).unwrap_err();
            assert!(
                matches!(err, AuthError::MissingClaims(name) if name == claim.name),
                "{dropped}: {err:?}"
            );
        }
    }

    #[test]
    fn test_empty_and_non_string_values_do_not_count() {
        let verifier = TokenVerifier::new(SECRET);
        let token = sign(&json!({
            "company_id": "",
            "companyId": 42,
            "user_id": "user_1",
            "membership_id": "mem_1",
        }));
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::MissingClaims("company id"))
        ));
    }

    #[test]
    fn test_earlier_alias_wins() {
        let verifier = TokenVerifier::new(SECRET);
        let token = sign(&json!({
            "company_id": "first",
            "company": "last",
            "user": "user_1",
            "access_id": "mem_1",
        }));
        assert_eq!(verifier.verify(&token).unwrap().company_id, "first");
    }

    #[test]
    fn test_wrong_secret_is_verification_error() {
        let verifier = TokenVerifier::new(SECRET);
        let token = sign_with(
            "another-secret",
            Algorithm::HS256,
            &json!({"company_id": "biz_1", "user_id": "user_1", "membership_id": "mem_1"}),
        );
        let err = verifier.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenVerification(_)));
        assert!(!err.to_string().contains(SECRET));
    }

    #[test]
    fn test_hs512_and_garbage() {
        let verifier = TokenVerifier::new(SECRET);
        let token = sign_with(
            SECRET,
            Algorithm::HS512,
            &json!({"companyId": "biz_1", "userId": "user_1", "membershipId": "mem_1"}),
        );
        assert_eq!(verifier.verify(&token).unwrap(), expected());
        assert!(matches!(
            verifier.verify("not-a-jwt"),
            Err(AuthError::TokenVerification(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let verifier = TokenVerifier::new(SECRET);
        let past = chrono::Utc::now().timestamp() - 3600;
        let token = sign(&json!({
            "company_id": "biz_1", "user_id": "user_1", "membership_id": "mem_1", "exp": past,
        }));
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::TokenVerification(_))
        ));
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        assert!(matches!(
            TokenVerifier::from_config(&AuthConfig::default()),
            Err(AuthError::Configuration(_))
        ));
    }
}
