//! Domain Layer
//!
//! Entities, value objects, and the ports (repository and identity
//! provider traits) the application layer is written against.

pub mod entity;
pub mod provider;
pub mod repository;
pub mod value_object;

pub use entity::{
    membership::Membership, principal::Principal, session::Session, user::User,
    workspace::Workspace,
};
pub use provider::{IdentityProvider, Viewer, ViewerMembership};
pub use repository::{
    MembershipRepository, SessionRepository, TenantStore, UserRepository, WorkspaceRepository,
};
