//! Presentation Layer
//!
//! HTTP handlers, DTOs and routers.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::{PaymentsAppState, WebhookState};
pub use router::{payments_router, webhook_router};
