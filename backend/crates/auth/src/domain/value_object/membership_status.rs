//! Membership Status
//!
//! Kept as the raw string the provider sent. Whether it grants access is
//! decided by one normalization rule, not by parsing into an enum.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MembershipStatus(String);

impl MembershipStatus {
    pub const ACTIVE: &'static str = "active";
    pub const INACTIVE: &'static str = "inactive";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn active() -> Self {
        Self::new(Self::ACTIVE)
    }

    pub fn inactive() -> Self {
        Self::new(Self::INACTIVE)
    }

    /// Active iff the trimmed, lowercased value is exactly `active`.
    pub fn is_active(&self) -> bool {
        self.0.trim().to_lowercase() == Self::ACTIVE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
