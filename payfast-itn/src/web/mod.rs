//! Web server module for receiving Payfast ITNs.
//!
//! - `POST /webhooks/payfast`: verify, validate and relay a notification
//! - `GET /health`: liveness probe

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{
    health, method_not_allowed, payfast_itn, AppState, HealthResponse, WebhookResponse,
};

/// Path Payfast is configured to notify.
pub const ITN_PATH: &str = "/webhooks/payfast";

/// Build the router with tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(ITN_PATH, post(payfast_itn).fallback(method_not_allowed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
