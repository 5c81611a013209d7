//! User Entity
//!
//! Local mirror of an identity-provider account. The provider owns the
//! data; we keep the external id as the unique key and refresh the
//! profile fields on every OAuth login.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Provider account id. Unique, never changes after insert.
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields written by an OAuth upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl User {
    pub fn new(profile: &UserProfile) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            external_id: profile.external_id.clone(),
            email: profile.email.clone(),
            name: profile.name.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the mutable fields. The key stays.
    pub fn apply(&mut self, profile: &UserProfile) {
        self.email = profile.email.clone();
        self.name = profile.name.clone();
        self.updated_at = Utc::now();
    }
}
