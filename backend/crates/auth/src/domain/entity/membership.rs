//! Membership Entity

use chrono::{DateTime, Utc};
use kernel::id::{MembershipId, UserId, WorkspaceId};

use crate::domain::value_object::membership_status::MembershipStatus;

/// A user's access right to one product inside one workspace.
///
/// `(user_id, workspace_id, product_id)` is unique; it is what keeps
/// repeated logins from creating duplicate rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub id: MembershipId,
    pub user_id: UserId,
    pub workspace_id: WorkspaceId,
    pub product_id: String,
    pub status: MembershipStatus,
    pub external_membership_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input of a membership upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipUpsert {
    pub user_id: UserId,
    pub workspace_id: WorkspaceId,
    pub product_id: String,
    pub status: MembershipStatus,
    pub external_membership_id: Option<String>,
}

impl Membership {
    pub fn new(input: &MembershipUpsert) -> Self {
        let now = Utc::now();
        Self {
            id: MembershipId::new(),
            user_id: input.user_id,
            workspace_id: input.workspace_id,
            product_id: input.product_id.clone(),
            status: input.status.clone(),
            external_membership_id: input.external_membership_id.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, input: &MembershipUpsert) {
        self.status = input.status.clone();
        self.external_membership_id = input.external_membership_id.clone();
        self.updated_at = Utc::now();
    }
}
