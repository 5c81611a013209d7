//! Data Transfer Objects

use kernel::id::FailedPaymentId;
use serde::{Deserialize, Serialize};

/// PATCH /api/payments/{id} request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// POST /api/seed response
#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub success: bool,
    pub message: &'static str,
    pub id: FailedPaymentId,
}

/// POST /api/webhook/failed-payment response
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub id: FailedPaymentId,
}
