//! In-Memory Payment Repository
//!
//! Records are kept in insertion order; listing walks them backwards.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{FailedPaymentId, WorkspaceId};
use tokio::sync::Mutex;

use crate::domain::entity::{FailedPayment, NewFailedPayment};
use crate::domain::repository::PaymentRepository;
use crate::domain::value_object::PaymentStatus;
use crate::error::PaymentResult;

#[derive(Clone, Default)]
pub struct InMemoryPaymentRepository {
    payments: Arc<Mutex<Vec<FailedPayment>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PaymentRepository for InMemoryPaymentRepository {
    async fn insert_payment(&self, input: NewFailedPayment) -> PaymentResult<FailedPayment> {
        let payment = FailedPayment::new(input);
        self.payments.lock().await.push(payment.clone());
        Ok(payment)
    }

    async fn list_payments(&self, workspace_id: WorkspaceId) -> PaymentResult<Vec<FailedPayment>> {
        Ok(self
            .payments
            .lock()
            .await
            .iter()
            .rev()
            .filter(|p| p.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn find_payment(
        &self,
        workspace_id: WorkspaceId,
        id: FailedPaymentId,
    ) -> PaymentResult<Option<FailedPayment>> {
        Ok(self
            .payments
            .lock()
            .await
            .iter()
            .find(|p| p.id == id && p.workspace_id == workspace_id)
            .cloned())
    }

    async fn update_status(
        &self,
        workspace_id: WorkspaceId,
        id: FailedPaymentId,
        status: &PaymentStatus,
    ) -> PaymentResult<Option<FailedPayment>> {
        let mut payments = self.payments.lock().await;
        let Some(payment) = payments
            .iter_mut()
            .find(|p| p.id == id && p.workspace_id == workspace_id)
        else {
            return Ok(None);
        };
        payment.status = status.clone();
        payment.updated_at = Utc::now();
        Ok(Some(payment.clone()))
    }
}
