//! Payments Configuration

use crate::error::{PaymentError, PaymentResult};

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Shared secret of the failed-payment webhook.
    pub webhook_secret: Option<String>,
    pub secret_header: String,
    pub company_header: String,
    pub default_currency: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            secret_header: "x-webhook-secret".to_string(),
            company_header: "x-company-id".to_string(),
            default_currency: "USD".to_string(),
        }
    }
}

impl PaymentConfig {
    /// Overlay `WEBHOOK_SECRET` found through `lookup`. Empty counts as unset.
    pub fn with_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("WEBHOOK_SECRET").filter(|s| !s.trim().is_empty()) {
            self.webhook_secret = Some(secret);
        }
        self
    }

    pub fn webhook_secret(&self) -> PaymentResult<&str> {
        self.webhook_secret
            .as_deref()
            .ok_or(PaymentError::WebhookNotConfigured)
    }
}
