//! HTTP server
//!
//! Endpoints:
//! - GET /health - Health check with operator identity
//! - POST /bfhl - Single-operation dispatch (any method on /bfhl is rate limited per client IP)
//!
//! Every other path or method answers with the 404 envelope.

mod handlers;
pub mod rate_limit;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::http::create_client;
use crate::llm::{AnswerModel, GeminiClient};
use rate_limit::RateLimiter;

/// How often idle rate-limit entries are dropped
const RATE_LIMIT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

// ============================================================================
// Server State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// None when no API key is configured
    pub model: Option<Arc<dyn AnswerModel>>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Build state from configuration, wiring Gemini when a key is present
    pub fn from_config(config: ServerConfig) -> Result<Self> {
        let model = match config.ai.api_key.clone() {
            Some(key) => {
                let client = create_client(config.ai.timeout)?;
                Some(Arc::new(GeminiClient::new(client, key, config.ai.model.clone()))
                    as Arc<dyn AnswerModel>)
            }
            None => None,
        };
        Self::with_model(config, model)
    }

    /// Build state with an explicit answer model
    pub fn with_model(config: ServerConfig, model: Option<Arc<dyn AnswerModel>>) -> Result<Self> {
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit)?);
        Ok(Self {
            config: Arc::new(config),
            model,
            rate_limiter,
        })
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Security headers applied to every response
fn security_headers() -> [(HeaderName, HeaderValue); 4] {
    [
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
        (header::REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        (header::X_DNS_PREFETCH_CONTROL, HeaderValue::from_static("off")),
    ]
}

/// Create the router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let bfhl = post(handlers::bfhl_handler)
        .fallback(handlers::not_found_handler)
        .layer(DefaultBodyLimit::max(state.config.body_limit_bytes))
        // `layer` rather than `route_layer`: every method on /bfhl spends quota
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit::enforce,
        ));

    let mut router = Router::new()
        .route(
            "/health",
            get(handlers::health_handler).fallback(handlers::not_found_handler),
        )
        .route("/bfhl", bfhl)
        .fallback(handlers::not_found_handler);

    for (name, value) in security_headers() {
        router = router.layer(SetResponseHeaderLayer::if_not_present(name, value));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until Ctrl-C
pub async fn run(config: ServerConfig) -> Result<()> {
    config.log_status();
    let bind_address = config.bind_address();

    let state = AppState::from_config(config)?;
    let limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            limiter.prune();
        }
    });

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Server listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);
    info!("BFHL API:     http://{}/bfhl", bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
