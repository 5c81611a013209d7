//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use auth::domain::repository::SessionRepository;
use auth::presentation::{AccessState, AuthAppState};
use auth::{
    AuthConfig, HttpIdentityProvider, PgAuthRepository, auth_router, require_access_on,
    with_edge_gatekeeper,
};
use axum::{
    Router, http,
    http::{Method, header},
    routing::get,
};
use chrono::Utc;
use payments::{
    PaymentConfig, PaymentsAppState, PgPaymentRepository, WebhookState, payments_router,
    webhook_router,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

fn lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,payments=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set in environment"))?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let auth_repo = PgAuthRepository::new(pool.clone());
    let payment_repo = PgPaymentRepository::new(pool.clone());

    // Startup cleanup: errors here should not prevent server startup
    if let Err(e) = auth_repo.cleanup_expired_sessions(Utc::now()).await {
        tracing::warn!(
            error = %e,
            "Auth session cleanup failed, continuing anyway"
        );
    }

    // Auth configuration; missing secrets surface as 500s at the point of use
    let auth_config = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        AuthConfig::default()
    }
    .with_lookup(lookup);
    let payment_config = PaymentConfig::default().with_lookup(lookup);

    for (name, missing) in [
        ("PLATFORM_TOKEN_SECRET", auth_config.platform_token_secret.is_none()),
        ("PRODUCT_ID", auth_config.product_id.is_none()),
        ("WEBHOOK_SECRET", payment_config.webhook_secret.is_none()),
    ] {
        if missing {
            tracing::warn!(setting = name, "Setting not configured");
        }
    }

    let provider = HttpIdentityProvider::from_config(&auth_config)?;
    let auth_config = Arc::new(auth_config);
    let auth_repo = Arc::new(auth_repo);

    let access = AccessState {
        repo: auth_repo.clone(),
        config: auth_config.clone(),
    };
    let auth_state = AuthAppState {
        repo: auth_repo.clone(),
        provider: Arc::new(provider),
        config: auth_config.clone(),
    };

    // CORS configuration
    let frontend_origins =
        env::var("FRONTEND_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Gated routes
    let dashboard = Router::new().route("/dashboard", get(|| async { "dashboard" }));
    let gated = require_access_on(
        dashboard.merge(payments_router(PaymentsAppState {
            repo: Arc::new(payment_repo.clone()),
        })),
        access,
    );

    let webhook = webhook_router(WebhookState::new(
        Arc::new(payment_repo),
        auth_repo,
        payment_config,
    ));

    // Build router
    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/login", get(|| async { "login" }))
        .route("/no-access", get(|| async { "no access" }))
        .nest("/api/auth", auth_router(auth_state))
        .merge(gated)
        .merge(webhook);

    let app = with_edge_gatekeeper(app, auth_config)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
