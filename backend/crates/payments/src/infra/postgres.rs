//! PostgreSQL Payment Repository
//!
//! Every statement filters on `workspace_id` alongside the record id.

use chrono::{DateTime, Utc};
use kernel::id::{FailedPaymentId, WorkspaceId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{FailedPayment, NewFailedPayment};
use crate::domain::repository::PaymentRepository;
use crate::domain::value_object::PaymentStatus;
use crate::error::PaymentResult;

const COLUMNS: &str = "id, workspace_id, customer_name, customer_email, product_name, \
                       amount, currency, reason, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl PaymentRepository for PgPaymentRepository {
    async fn insert_payment(&self, input: NewFailedPayment) -> PaymentResult<FailedPayment> {
        let payment = FailedPayment::new(input);

        sqlx::query(
            r#"
            INSERT INTO failed_payments (
                id, workspace_id, customer_name, customer_email, product_name,
                amount, currency, reason, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.workspace_id.as_uuid())
        .bind(&payment.customer_name)
        .bind(&payment.customer_email)
        .bind(&payment.product_name)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.reason)
        .bind(payment.status.as_str())
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(payment)
    }

    async fn list_payments(&self, workspace_id: WorkspaceId) -> PaymentResult<Vec<FailedPayment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {COLUMNS} FROM failed_payments WHERE workspace_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(workspace_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PaymentRow::into_payment).collect())
    }

    async fn find_payment(
        &self,
        workspace_id: WorkspaceId,
        id: FailedPaymentId,
    ) -> PaymentResult<Option<FailedPayment>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {COLUMNS} FROM failed_payments WHERE id = $1 AND workspace_id = $2"
        ))
        .bind(id.as_uuid())
        .bind(workspace_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PaymentRow::into_payment))
    }

    async fn update_status(
        &self,
        workspace_id: WorkspaceId,
        id: FailedPaymentId,
        status: &PaymentStatus,
    ) -> PaymentResult<Option<FailedPayment>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "UPDATE failed_payments SET status = $3, updated_at = now() \
             WHERE id = $1 AND workspace_id = $2 RETURNING {COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(workspace_id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PaymentRow::into_payment))
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    workspace_id: Uuid,
    customer_name: String,
    customer_email: String,
    product_name: String,
    amount: f64,
    currency: String,
    reason: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_payment(self) -> FailedPayment {
        FailedPayment {
            id: FailedPaymentId::from_uuid(self.id),
            workspace_id: WorkspaceId::from_uuid(self.workspace_id),
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            product_name: self.product_name,
            amount: self.amount,
            currency: self.currency,
            reason: self.reason,
            status: PaymentStatus::from_db(self.status),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
