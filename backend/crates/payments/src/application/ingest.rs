//! Ingest Failed Payment Use Case
//!
//! The webhook entry point: shared-secret check, payload validation,
//! workspace resolution by company id, insert.

use std::sync::Arc;

use auth::domain::repository::WorkspaceRepository;
use platform::crypto::constant_time_eq;
use serde::Deserialize;

use crate::application::config::PaymentConfig;
use crate::domain::entity::{FailedPayment, NewFailedPayment};
use crate::domain::repository::PaymentRepository;
use crate::error::{PaymentError, PaymentResult};

/// `amount` arrives as a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    fn value(&self) -> PaymentResult<f64> {
        let value = match self {
            Amount::Number(n) => *n,
            Amount::Text(s) => s.trim().parse::<f64>().map_err(|_| PaymentError::InvalidAmount)?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(PaymentError::InvalidAmount)
        }
    }
}

/// Webhook body. Every field is optional here so that validation can
/// answer with one precise error instead of a deserializer message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedPaymentWebhook {
    #[serde(rename = "company_id")]
    pub company_id_snake: Option<String>,
    pub company_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub product_name: Option<String>,
    pub amount: Option<Amount>,
    pub currency: Option<String>,
    pub reason: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub struct IngestFailedPaymentUseCase<R, W>
where
    R: PaymentRepository,
    W: WorkspaceRepository,
{
    payments: Arc<R>,
    workspaces: Arc<W>,
    config: Arc<PaymentConfig>,
}

impl<R, W> IngestFailedPaymentUseCase<R, W>
where
    R: PaymentRepository,
    W: WorkspaceRepository,
{
    pub fn new(payments: Arc<R>, workspaces: Arc<W>, config: Arc<PaymentConfig>) -> Self {
        Self {
            payments,
            workspaces,
            config,
        }
    }

    /// Compare the presented secret with `WEBHOOK_SECRET` in constant time.
    pub fn authorize(&self, presented: Option<&str>) -> PaymentResult<()> {
        let expected = self.config.webhook_secret()?;
        match presented {
            Some(presented) if constant_time_eq(presented.as_bytes(), expected.as_bytes()) => Ok(()),
            _ => Err(PaymentError::WebhookUnauthorized),
        }
    }

    /// Validate and store. `header_company_id` is the fallback when the
    /// body names no company.
    pub async fn execute(
        &self,
        payload: FailedPaymentWebhook,
        header_company_id: Option<String>,
    ) -> PaymentResult<FailedPayment> {
        let company_id = non_empty(payload.company_id_snake)
            .or(non_empty(payload.company_id))
            .or(non_empty(header_company_id))
            .ok_or(PaymentError::MissingCompany)?;

        let (Some(customer_name), Some(customer_email), Some(product_name), Some(amount)) = (
            non_empty(payload.customer_name),
            non_empty(payload.customer_email),
            non_empty(payload.product_name),
            payload.amount,
        ) else {
            return Err(PaymentError::MissingFields);
        };
        let amount = amount.value()?;

        let workspace = self.workspaces.ensure_workspace(&company_id).await?;

        let payment = self
            .payments
            .insert_payment(NewFailedPayment {
                workspace_id: workspace.id,
                customer_name,
                customer_email,
                product_name,
                amount,
                currency: non_empty(payload.currency)
                    .unwrap_or_else(|| self.config.default_currency.clone()),
                reason: non_empty(payload.reason),
            })
            .await?;

        tracing::info!(
            payment_id = %payment.id,
            workspace_id = %workspace.id,
            company_id = %company_id,
            "Failed payment ingested"
        );

        Ok(payment)
    }
}
