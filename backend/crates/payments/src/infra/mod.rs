//! Infrastructure Layer

pub mod memory;
pub mod postgres;

pub use memory::InMemoryPaymentRepository;
pub use postgres::PgPaymentRepository;
