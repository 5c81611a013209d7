//! Verified platform claims
//!
//! The normalized triple taken out of a platform token after its
//! signature checked out. The gatekeeper stores it in the request
//! extensions; clients cannot put it there.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub company_id: String,
    pub user_id: String,
    pub membership_id: String,
}
