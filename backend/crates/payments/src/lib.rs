//! Payments (Failed-Payment Records) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Failed payment entity, status value object, repository trait
//! - `application/` - Dashboard use cases and the ingest webhook
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! Every record belongs to one workspace. Dashboard routes read the
//! workspace from the `auth::Principal` placed by `require_access`; the
//! webhook resolves it from the company id in the payload.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::PaymentConfig;
pub use domain::entity::{FailedPayment, NewFailedPayment};
pub use domain::value_object::PaymentStatus;
pub use error::{PaymentError, PaymentResult};
pub use infra::{InMemoryPaymentRepository, PgPaymentRepository};
pub use presentation::handlers::{PaymentsAppState, WebhookState};
pub use presentation::router::{payments_router, webhook_router};
