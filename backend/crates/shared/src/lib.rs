//! Shared Kernel
//!
//! Vocabulary every backend crate agrees on:
//! - [`error::app_error::AppError`], the unified error rendered as problem JSON
//! - [`id::Id`], UUID identifiers tagged with the entity they point at
//!
//! Nothing here knows about tenants, sessions or payments beyond their names.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
