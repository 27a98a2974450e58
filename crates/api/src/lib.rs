//! # schedman API
//!
//! The web server of the schedule manager: account registration and
//! token-based sessions, plus CRUD and a weekday-grouped view of access
//! schedules.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Decode requests, call the core services, encode responses
//! - **Middleware**: Authentication, tokens, cookies and error mapping
//! - **Config**: Environment-driven settings
//!
//! The API uses Axum as the web framework and SQLx for database interactions.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Authentication, token and error handling helpers
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use eyre::{Result, WrapErr};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::{
    config::{ApiConfig, AuthConfig},
    middleware::jwt::TokenKeys,
};

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Token lifetimes, rotation and cookie settings
    pub auth: AuthConfig,
    /// Keys signing and verifying access and refresh tokens
    pub tokens: TokenKeys,
}

impl ApiState {
    pub fn new(db_pool: PgPool, auth: AuthConfig) -> Self {
        let tokens = TokenKeys::from_config(&auth);
        Self {
            db_pool,
            auth,
            tokens,
        }
    }
}

/// Every route of the service, with the shared state attached.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Registration, login and token endpoints
        .merge(routes::auth::routes())
        // Schedule management endpoints
        .merge(routes::schedule::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .wrap_err_with(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(origins)
        .allow_credentials(true))
}

/// Starts the API server with the provided configuration and database connection
///
/// # Example
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// let config = schedman_api::config::ApiConfig::from_env()?;
/// let db_pool = schedman_db::create_pool(&config.database_url).await?;
/// schedman_api::start_server(config, db_pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState::new(db_pool, config.auth.clone()));
    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)?),
        None => app,
    };

    // Add request timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(axum::error_handling::HandleErrorLayer::new(
                |_: tower::BoxError| async { axum::http::StatusCode::REQUEST_TIMEOUT },
            ))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
