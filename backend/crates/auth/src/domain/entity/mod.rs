//! Entities

pub mod membership;
pub mod principal;
pub mod session;
pub mod user;
pub mod workspace;
