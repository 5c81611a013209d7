//! Domain Layer

pub mod entity;
pub mod repository;
pub mod value_object;

pub use entity::{FailedPayment, NewFailedPayment};
pub use repository::PaymentRepository;
pub use value_object::PaymentStatus;
