//! Manage Payments Use Case
//!
//! Dashboard operations on the principal's own workspace.

use std::sync::Arc;

use kernel::id::{FailedPaymentId, WorkspaceId};

use crate::domain::entity::{FailedPayment, NewFailedPayment};
use crate::domain::repository::PaymentRepository;
use crate::domain::value_object::PaymentStatus;
use crate::error::{PaymentError, PaymentResult};

pub struct ManagePaymentsUseCase<R>
where
    R: PaymentRepository,
{
    repo: Arc<R>,
}

impl<R> ManagePaymentsUseCase<R>
where
    R: PaymentRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, workspace_id: WorkspaceId) -> PaymentResult<Vec<FailedPayment>> {
        self.repo.list_payments(workspace_id).await
    }

    pub async fn get(
        &self,
        workspace_id: WorkspaceId,
        id: FailedPaymentId,
    ) -> PaymentResult<FailedPayment> {
        self.repo
            .find_payment(workspace_id, id)
            .await?
            .ok_or(PaymentError::NotFound)
    }

    pub async fn update_status(
        &self,
        workspace_id: WorkspaceId,
        id: FailedPaymentId,
        raw_status: Option<&str>,
    ) -> PaymentResult<FailedPayment> {
        let status = PaymentStatus::parse(raw_status.unwrap_or_default())?;

        let updated = self
            .repo
            .update_status(workspace_id, id, &status)
            .await?
            .ok_or(PaymentError::NotFound)?;

        tracing::info!(
            payment_id = %updated.id,
            workspace_id = %workspace_id,
            status = %updated.status,
            "Payment status updated"
        );

        Ok(updated)
    }

    /// Insert the sample record into the workspace.
    pub async fn seed(&self, workspace_id: WorkspaceId) -> PaymentResult<FailedPayment> {
        let payment = self
            .repo
            .insert_payment(NewFailedPayment::sample(workspace_id))
            .await?;
        tracing::info!(payment_id = %payment.id, workspace_id = %workspace_id, "Sample payment created");
        Ok(payment)
    }
}
