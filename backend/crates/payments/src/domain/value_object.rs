//! Payment Status
//!
//! Free-form workflow label (`FAILED`, `CONTACTED`, `RECOVERED`, ...),
//! stored upper-cased.

use serde::Serialize;
use std::fmt;

use crate::error::{PaymentError, PaymentResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PaymentStatus(String);

impl PaymentStatus {
    pub const FAILED: &'static str = "FAILED";
    pub const MAX_LEN: usize = 32;

    pub fn failed() -> Self {
        Self(Self::FAILED.to_string())
    }

    /// Trim and upper-case client input.
    pub fn parse(raw: &str) -> PaymentResult<Self> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(PaymentError::MissingStatus);
        }
        if normalized.chars().count() > Self::MAX_LEN {
            return Err(PaymentError::StatusTooLong { max: Self::MAX_LEN });
        }
        Ok(Self(normalized))
    }

    /// Value read back from the store, trusted as-is.
    pub fn from_db(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes() {
        assert_eq!(PaymentStatus::parse(" recovered ").unwrap().as_str(), "RECOVERED");
        assert_eq!(PaymentStatus::parse("Contacted").unwrap().as_str(), "CONTACTED");
        assert!(PaymentStatus::parse(&"x".repeat(32)).is_ok());
    }

    #[test]
    fn test_parse_rejects() {
        assert!(matches!(PaymentStatus::parse("   "), Err(PaymentError::MissingStatus)));
        assert!(matches!(PaymentStatus::parse(""), Err(PaymentError::MissingStatus)));
        assert!(matches!(
            PaymentStatus::parse(&"x".repeat(33)),
            Err(PaymentError::StatusTooLong { max: 32 })
        ));
    }
}
