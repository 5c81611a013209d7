//! HTTP Handlers
//!
//! Dashboard handlers run behind `require_access` and take the workspace
//! from the resolved [`Principal`], never from the request.

use std::sync::Arc;

use auth::Principal;
use auth::domain::repository::WorkspaceRepository;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Path, State};
use axum::http::{HeaderMap, StatusCode};
use kernel::id::FailedPaymentId;
use uuid::Uuid;

use crate::application::{
    FailedPaymentWebhook, IngestFailedPaymentUseCase, ManagePaymentsUseCase, PaymentConfig,
};
use crate::domain::entity::FailedPayment;
use crate::domain::repository::PaymentRepository;
use crate::error::{PaymentError, PaymentResult};
use crate::presentation::dto::{SeedResponse, UpdateStatusRequest, WebhookResponse};

/// Shared state for dashboard handlers
pub struct PaymentsAppState<R>
where
    R: PaymentRepository + Sync + 'static,
{
    pub repo: Arc<R>,
}

impl<R> Clone for PaymentsAppState<R>
where
    R: PaymentRepository + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<R> PaymentsAppState<R>
where
    R: PaymentRepository + Sync + 'static,
{
    pub fn new(repo: R) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }

    fn use_case(&self) -> ManagePaymentsUseCase<R> {
        ManagePaymentsUseCase::new(self.repo.clone())
    }
}

/// Shared state for the webhook
pub struct WebhookState<R, W>
where
    R: PaymentRepository + Sync + 'static,
    W: WorkspaceRepository + Sync + 'static,
{
    pub payments: Arc<R>,
    pub workspaces: Arc<W>,
    pub config: Arc<PaymentConfig>,
}

impl<R, W> Clone for WebhookState<R, W>
where
    R: PaymentRepository + Sync + 'static,
    W: WorkspaceRepository + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            payments: self.payments.clone(),
            workspaces: self.workspaces.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R, W> WebhookState<R, W>
where
    R: PaymentRepository + Sync + 'static,
    W: WorkspaceRepository + Sync + 'static,
{
    pub fn new(payments: Arc<R>, workspaces: Arc<W>, config: PaymentConfig) -> Self {
        Self {
            payments,
            workspaces,
            config: Arc::new(config),
        }
    }

    fn use_case(&self) -> IngestFailedPaymentUseCase<R, W> {
        IngestFailedPaymentUseCase::new(
            self.payments.clone(),
            self.workspaces.clone(),
            self.config.clone(),
        )
    }
}

/// Malformed ids are answered like unknown ones.
fn parse_id(raw: &str) -> PaymentResult<FailedPaymentId> {
    Uuid::parse_str(raw)
        .map(FailedPaymentId::from_uuid)
        .map_err(|_| PaymentError::NotFound)
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ============================================================================
// Dashboard
// ============================================================================

/// GET /api/payments
pub async fn list_payments<R>(
    State(state): State<PaymentsAppState<R>>,
    Extension(principal): Extension<Principal>,
) -> PaymentResult<Json<Vec<FailedPayment>>>
where
    R: PaymentRepository + Sync + 'static,
{
    let payments = state.use_case().list(principal.workspace_id).await?;
    Ok(Json(payments))
}

/// GET /api/payments/{id}
pub async fn get_payment<R>(
    State(state): State<PaymentsAppState<R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> PaymentResult<Json<FailedPayment>>
where
    R: PaymentRepository + Sync + 'static,
{
    let id = parse_id(&id)?;
    let payment = state.use_case().get(principal.workspace_id, id).await?;
    Ok(Json(payment))
}

/// PATCH /api/payments/{id}
pub async fn update_payment_status<R>(
    State(state): State<PaymentsAppState<R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Bytes,
) -> PaymentResult<Json<FailedPayment>>
where
    R: PaymentRepository + Sync + 'static,
{
    let id = parse_id(&id)?;
    let request: UpdateStatusRequest =
        serde_json::from_slice(&body).map_err(PaymentError::InvalidBody)?;

    let payment = state
        .use_case()
        .update_status(principal.workspace_id, id, request.status.as_deref())
        .await?;
    Ok(Json(payment))
}

/// POST /api/seed
pub async fn seed_payment<R>(
    State(state): State<PaymentsAppState<R>>,
    Extension(principal): Extension<Principal>,
) -> PaymentResult<Json<SeedResponse>>
where
    R: PaymentRepository + Sync + 'static,
{
    let payment = state.use_case().seed(principal.workspace_id).await?;
    Ok(Json(SeedResponse {
        success: true,
        message: "Sample payment created",
        id: payment.id,
    }))
}

// ============================================================================
// Webhook
// ============================================================================

/// POST /api/webhook/failed-payment
///
/// The secret is checked before the body is parsed.
pub async fn failed_payment_webhook<R, W>(
    State(state): State<WebhookState<R, W>>,
    headers: HeaderMap,
    body: Bytes,
) -> PaymentResult<(StatusCode, Json<WebhookResponse>)>
where
    R: PaymentRepository + Sync + 'static,
    W: WorkspaceRepository + Sync + 'static,
{
    let use_case = state.use_case();
    use_case.authorize(header_str(&headers, &state.config.secret_header).as_deref())?;

    let payload: FailedPaymentWebhook =
        serde_json::from_slice(&body).map_err(PaymentError::InvalidBody)?;
    let company_header = header_str(&headers, &state.config.company_header);

    let payment = use_case.execute(payload, company_header).await?;

    Ok((
        StatusCode::CREATED,
        Json(WebhookResponse {
            success: true,
            id: payment.id,
        }),
    ))
}
