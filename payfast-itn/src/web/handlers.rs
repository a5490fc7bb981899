//! Webhook endpoint handlers.
//!
//! The ITN handler takes the body as a raw string so the exact bytes can be
//! posted back to Payfast. Only the status code matters to the provider; the
//! JSON body is for humans reading logs and test output.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::payfast::PayfastValidator;
use crate::process::{process_notification, ItnOutcome};
use crate::relay::RelayPublisher;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub validator: PayfastValidator,
    pub relay: RelayPublisher,
}

impl AppState {
    /// Build the state and the outbound HTTP client shared by both collaborators.
    pub fn new(config: Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            validator: PayfastValidator::new(client.clone(), config.validate_url.clone()),
            relay: RelayPublisher::new(client, config.relay_endpoint.clone()),
            config: Arc::new(config),
        })
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Payfast ITN
// =============================================================================

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Payfast ITN endpoint.
///
/// - 200: processed, or acknowledged for a non-`COMPLETE` status
/// - 400: missing fields, signature mismatch, provider said not `VALID`
/// - 500: provider or relay unreachable, relay rejected the submission
pub async fn payfast_itn(State(state): State<AppState>, body: String) -> impl IntoResponse {
    info!(body_length = body.len(), "payfast_itn_received");

    let result = process_notification(&state.config, &state.validator, &state.relay, &body).await;

    if let Ok(outcome) = &result {
        info!(reference = outcome.reference(), "payfast_itn_complete");
    }

    match result {
        Ok(ItnOutcome::Acknowledged { reference, status }) => (
            StatusCode::OK,
            Json(WebhookResponse {
                status: "acknowledged",
                message: format!("Payment status {} received.", status),
                reference: Some(reference),
            }),
        ),
        Ok(ItnOutcome::Forwarded { reference }) => (
            StatusCode::OK,
            Json(WebhookResponse {
                status: "processed",
                message: "ITN processed and relayed.".to_string(),
                reference: Some(reference),
            }),
        ),
        Err(e) => {
            let code = e.status_code();
            if code.is_server_error() {
                error!(error = %e, status_code = code.as_u16(), "payfast_itn_failed");
            } else {
                warn!(error = %e, status_code = code.as_u16(), "payfast_itn_rejected");
            }
            (
                code,
                Json(WebhookResponse {
                    status: e.label(),
                    message: e.to_string(),
                    reference: None,
                }),
            )
        }
    }
}

/// Any method other than POST on the ITN route.
pub async fn method_not_allowed(method: Method) -> impl IntoResponse {
    warn!(method = %method, "payfast_itn_method_not_allowed");
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(WebhookResponse {
            status: "method_not_allowed",
            message: "Method Not Allowed".to_string(),
            reference: None,
        }),
    )
}
