//! Payments Routers

use auth::domain::repository::WorkspaceRepository;
use axum::{
    Router,
    routing::{get, post},
};

use crate::domain::repository::PaymentRepository;
use crate::presentation::handlers::{self, PaymentsAppState, WebhookState};

/// Dashboard routes. Every handler expects a `Principal` extension, so the
/// caller must wrap this router with `auth::require_access_on`.
pub fn payments_router<R>(state: PaymentsAppState<R>) -> Router
where
    R: PaymentRepository + Sync + 'static,
{
    Router::new()
        .route("/api/payments", get(handlers::list_payments::<R>))
        .route(
            "/api/payments/{id}",
            get(handlers::get_payment::<R>).patch(handlers::update_payment_status::<R>),
        )
        .route("/api/seed", post(handlers::seed_payment::<R>))
        .with_state(state)
}

/// Failed-payment ingest, authenticated by shared secret only.
pub fn webhook_router<R, W>(state: WebhookState<R, W>) -> Router
where
    R: PaymentRepository + Sync + 'static,
    W: WorkspaceRepository + Sync + 'static,
{
    Router::new()
        .route(
            "/api/webhook/failed-payment",
            post(handlers::failed_payment_webhook::<R, W>),
        )
        .with_state(state)
}
