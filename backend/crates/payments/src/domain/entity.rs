//! Failed Payment Entity

use chrono::{DateTime, Utc};
use kernel::id::{FailedPaymentId, WorkspaceId};
use serde::Serialize;

use crate::domain::value_object::PaymentStatus;

/// One failed charge, owned by exactly one workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedPayment {
    pub id: FailedPaymentId,
    pub workspace_id: WorkspaceId,
    pub customer_name: String,
    pub customer_email: String,
    pub product_name: String,
    pub amount: f64,
    pub currency: String,
    pub reason: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a record before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFailedPayment {
    pub workspace_id: WorkspaceId,
    pub customer_name: String,
    pub customer_email: String,
    pub product_name: String,
    pub amount: f64,
    pub currency: String,
    pub reason: Option<String>,
}

impl NewFailedPayment {
    /// Record used by `POST /api/seed`.
    pub fn sample(workspace_id: WorkspaceId) -> Self {
        Self {
            workspace_id,
            customer_name: "John Doe".to_string(),
            customer_email: "john.doe@example.com".to_string(),
            product_name: "Premium Membership".to_string(),
            amount: 49.99,
            currency: "USD".to_string(),
            reason: Some("Insufficient funds".to_string()),
        }
    }
}

impl FailedPayment {
    /// New records always start as `FAILED`.
    pub fn new(input: NewFailedPayment) -> Self {
        let now = Utc::now();
        Self {
            id: FailedPaymentId::new(),
            workspace_id: input.workspace_id,
            customer_name: input.customer_name,
            customer_email: input.customer_email,
            product_name: input.product_name,
            amount: input.amount,
            currency: input.currency,
            reason: input.reason,
            status: PaymentStatus::failed(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_failed_and_serializes_camel_case() {
        let payment = FailedPayment::new(NewFailedPayment::sample(WorkspaceId::new()));
        assert_eq!(payment.status.as_str(), "FAILED");

        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["customerEmail"], "john.doe@example.com");
        assert_eq!(json["status"], "FAILED");
        assert_eq!(json["amount"], 49.99);
        assert!(json["workspaceId"].is_string());
    }
}
