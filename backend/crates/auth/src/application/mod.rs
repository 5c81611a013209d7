//! Application Layer
//!
//! Use cases and application services.

pub mod access_gate;
pub mod config;
pub mod oauth_flow;
pub mod principal;
pub mod session_store;
pub mod tenant_resolver;
pub mod token_verifier;

// Re-exports
pub use access_gate::{AccessDecision, AccessGate};
pub use config::{AuthConfig, OAuthSettings, PathPattern};
pub use oauth_flow::{CallbackOutcome, CallbackParams, OAuthFlowUseCase, OAuthInitiation};
pub use principal::{
    Credentials, EdgeClaimsStrategy, PrincipalResolver, PrincipalStrategy, SessionCookieStrategy,
    default_resolver,
};
pub use session_store::{NewSession, SessionStore};
pub use tenant_resolver::{Tenancy, TenantResolver};
pub use token_verifier::TokenVerifier;
