//! Application Layer
//!
//! Use cases and configuration.

pub mod config;
pub mod ingest;
pub mod manage_payments;

pub use config::PaymentConfig;
pub use ingest::{FailedPaymentWebhook, IngestFailedPaymentUseCase};
pub use manage_payments::ManagePaymentsUseCase;
