//! Repository Traits
//!
//! Every read and write takes the owning workspace: a record of another
//! workspace behaves exactly like a missing one.

use kernel::id::{FailedPaymentId, WorkspaceId};

use crate::domain::entity::{FailedPayment, NewFailedPayment};
use crate::domain::value_object::PaymentStatus;
use crate::error::PaymentResult;

#[trait_variant::make(PaymentRepository: Send)]
pub trait LocalPaymentRepository {
    async fn insert_payment(&self, input: NewFailedPayment) -> PaymentResult<FailedPayment>;

    /// Newest first.
    async fn list_payments(&self, workspace_id: WorkspaceId) -> PaymentResult<Vec<FailedPayment>>;

    async fn find_payment(
        &self,
        workspace_id: WorkspaceId,
        id: FailedPaymentId,
    ) -> PaymentResult<Option<FailedPayment>>;

    /// `None` when no row of this workspace has that id.
    async fn update_status(
        &self,
        workspace_id: WorkspaceId,
        id: FailedPaymentId,
        status: &PaymentStatus,
    ) -> PaymentResult<Option<FailedPayment>>;
}
