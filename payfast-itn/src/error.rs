//! Error kinds for ITN processing.
//!
//! Every failure is terminal for the invocation. The provider applies its own
//! retry policy based on the status code we return.

use axum::http::StatusCode;
use thiserror::Error;

/// A failed ITN invocation.
#[derive(Debug, Error)]
pub enum ItnError {
    #[error("missing configuration: {0}")]
    ConfigurationMissing(&'static str),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("provider rejected notification: {0}")]
    ProviderRejected(String),

    #[error("provider validation request failed: {0}")]
    ProviderUnreachable(String),

    #[error("relay rejected submission with status {0}")]
    RelayRejected(u16),

    #[error("relay request failed: {0}")]
    RelayUnreachable(String),
}

impl ItnError {
    /// HTTP status returned to the provider for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ItnError::ConfigurationMissing(_)
            | ItnError::MalformedRequest(_)
            | ItnError::SignatureMismatch
            | ItnError::ProviderRejected(_) => StatusCode::BAD_REQUEST,
            ItnError::ProviderUnreachable(_)
            | ItnError::RelayRejected(_)
            | ItnError::RelayUnreachable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable label used in response bodies.
    pub fn label(&self) -> &'static str {
        match self {
            ItnError::ConfigurationMissing(_) => "configuration_missing",
            ItnError::MalformedRequest(_) => "malformed_request",
            ItnError::SignatureMismatch => "signature_mismatch",
            ItnError::ProviderRejected(_) => "validation_failed",
            ItnError::ProviderUnreachable(_) => "validation_error",
            ItnError::RelayRejected(_) => "relay_failed",
            ItnError::RelayUnreachable(_) => "relay_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_bad_request() {
        assert_eq!(
            ItnError::ConfigurationMissing("PAYFAST_PASSPHRASE").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ItnError::MalformedRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ItnError::SignatureMismatch.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ItnError::ProviderRejected("INVALID".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_transport_errors_map_to_server_error() {
        assert_eq!(
            ItnError::ProviderUnreachable("refused".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ItnError::RelayRejected(422).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ItnError::RelayUnreachable("timeout".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
