//! Platform Crate - Technical Infrastructure
//!
//! Building blocks with no business meaning:
//! - Cryptographic utilities (SHA-256, random tokens, constant-time compare)
//! - Cookie parsing and `Set-Cookie` construction
//! - Outbound HTTP client construction

pub mod cookie;
pub mod crypto;
pub mod http;
