//! Auth (Authentication & Tenancy) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and provider traits
//! - `application/` - Use cases and application services
//! - `infra/` - PostgreSQL and in-memory stores, HTTP identity provider
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Platform-signed token verification with claim aliases
//! - OAuth authorization-code login with CSRF state cookie
//! - Opaque server-side sessions, stored only as SHA-256 hashes
//! - User / workspace / membership reconciliation by upsert
//! - One access decision: active membership for the target product
//!
//! ## Request Model
//! - `edge_gatekeeper` strips trusted tenant headers from every request and
//!   re-derives them from a verified token on protected paths
//! - `require_access` resolves a principal (edge claims, then session
//!   cookie) and asks the access gate

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::entity::principal::{AuthScheme, Principal};
pub use error::{AuthError, AuthResult};
pub use infra::{HttpIdentityProvider, InMemoryAuthRepository, PgAuthRepository};
pub use presentation::router::{auth_router, require_access_on, with_edge_gatekeeper};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::memory::InMemoryAuthRepository as MemoryAuthStore;
    pub use crate::infra::postgres::PgAuthRepository as AuthStore;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
