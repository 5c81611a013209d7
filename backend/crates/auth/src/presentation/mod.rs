//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::{AccessState, edge_gatekeeper, require_access};
pub use router::{auth_router, require_access_on, with_edge_gatekeeper};
