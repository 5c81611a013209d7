//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod memory;
pub mod postgres;
pub mod provider;

pub use memory::InMemoryAuthRepository;
pub use postgres::PgAuthRepository;
pub use provider::HttpIdentityProvider;
