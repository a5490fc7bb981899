//! Payfast ITN re-validation.
//!
//! The exact body we received is posted back to the provider, which answers
//! with the plain-text token `VALID` when it issued the notification.

use reqwest::{header::CONTENT_TYPE, Client};
use tracing::{error, info};

use crate::error::ItnError;

/// Response body confirming a genuine notification.
pub const VALID_RESPONSE: &str = "VALID";

/// Client for the provider validation endpoint. Single attempt, no retries.
#[derive(Clone)]
pub struct PayfastValidator {
    client: Client,
    url: String,
}

impl PayfastValidator {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Post `raw_body` unmodified and require an exact `VALID` reply.
    pub async fn validate(&self, raw_body: &str, reference: &str) -> Result<(), ItnError> {
        info!(
            reference = reference,
            url = %self.url,
            body_length = raw_body.len(),
            "payfast_validation_starting"
        );

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(raw_body.to_owned())
            .send()
            .await
            .map_err(|e| {
                error!(reference = reference, error = %e, "payfast_validation_request_failed");
                ItnError::ProviderUnreachable(e.to_string())
            })?;

        let status = response.status().as_u16();

        let body = response.text().await.map_err(|e| {
            error!(
                reference = reference,
                status_code = status,
                error = %e,
                "payfast_validation_read_failed"
            );
            ItnError::ProviderUnreachable(e.to_string())
        })?;

        if body != VALID_RESPONSE {
            error!(
                reference = reference,
                status_code = status,
                response = %truncate(&body, 200),
                "payfast_validation_failed"
            );
            return Err(ItnError::ProviderRejected(body));
        }

        info!(reference = reference, status_code = status, "payfast_validation_complete");

        Ok(())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
