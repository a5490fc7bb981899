//! HTTP publisher for confirmed submissions.
//!
//! Posts JSON to the configured form relay. One attempt per notification;
//! the provider's own ITN retries cover transient failures.

use reqwest::Client;
use tracing::{error, info};

use super::types::ConfirmedSubmission;
use crate::error::ItnError;

/// Relay client shared across requests.
#[derive(Clone)]
pub struct RelayPublisher {
    client: Client,
    endpoint: Option<String>,
}

impl RelayPublisher {
    /// Create a publisher. A `None` endpoint fails every publish.
    pub fn new(client: Client, endpoint: Option<String>) -> Self {
        Self { client, endpoint }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Publish a submission; any 2xx is success.
    pub async fn publish(&self, submission: &ConfirmedSubmission) -> Result<(), ItnError> {
        let reference = submission.reference_id.as_str();

        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            error!(reference = reference, "relay_endpoint_not_configured");
            ItnError::RelayUnreachable("relay endpoint not configured".to_string())
        })?;

        let response = self
            .client
            .post(endpoint)
            .json(submission)
            .send()
            .await
            .map_err(|e| {
                error!(reference = reference, error = %e, "relay_request_failed");
                ItnError::RelayUnreachable(e.to_string())
            })?;

        let status = response.status();

        if !status.is_success() {
            error!(
                reference = reference,
                status_code = status.as_u16(),
                "relay_submission_rejected"
            );
            return Err(ItnError::RelayRejected(status.as_u16()));
        }

        info!(
            reference = reference,
            status_code = status.as_u16(),
            "relay_submission_complete"
        );

        Ok(())
    }
}
