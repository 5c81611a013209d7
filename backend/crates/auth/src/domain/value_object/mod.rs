//! Value Object Module

pub mod membership_status;
pub mod platform_claims;
pub mod session_token;
