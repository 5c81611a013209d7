//! Workspace Entity
//!
//! The tenant. Keyed by the provider's business id, or by a synthetic
//! `personal_<viewer id>` when the viewer has no business.

use chrono::{DateTime, Utc};
use kernel::id::WorkspaceId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub external_id: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    pub fn new(external_id: &str, name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: WorkspaceId::new(),
            external_id: external_id.to_string(),
            name,
            created_at: now,
            updated_at: now,
        }
    }

    /// External id for a viewer without any business.
    pub fn personal_external_id(viewer_id: &str) -> String {
        format!("personal_{viewer_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personal_external_id() {
        assert_eq!(Workspace::personal_external_id("user_42"), "personal_user_42");
    }
}
