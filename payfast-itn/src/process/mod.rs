//! ITN processing pipeline.
//!
//! Each gate either passes the notification on or ends the invocation:
//!
//! ```text
//! raw body → parse → required fields → signature → status → Payfast validate → relay
//! ```
//!
//! Outbound calls run strictly one after the other; a failed validation
//! never reaches the relay.

use chrono::Utc;
use tracing::{info, warn};

use crate::error::ItnError;
use crate::itn::{verify_signature, Notification};
use crate::payfast::PayfastValidator;
use crate::relay::{ConfirmedSubmission, RelayPublisher};
use crate::Config;

/// Successful end states of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItnOutcome {
    /// Genuine notification for a non-terminal status; receipt acknowledged only.
    Acknowledged { reference: String, status: String },
    /// Verified payment forwarded to the relay.
    Forwarded { reference: String },
}

impl ItnOutcome {
    pub fn reference(&self) -> &str {
        match self {
            ItnOutcome::Acknowledged { reference, .. } | ItnOutcome::Forwarded { reference } => {
                reference
            }
        }
    }
}

/// Run one notification through every gate.
pub async fn process_notification(
    config: &Config,
    validator: &PayfastValidator,
    relay: &RelayPublisher,
    raw_body: &str,
) -> Result<ItnOutcome, ItnError> {
    let notification = Notification::parse(raw_body)?;

    info!(
        field_count = notification.len(),
        has_signature = notification.signature().is_some(),
        reference = notification.reference_id().unwrap_or_default(),
        payment_status = notification.payment_status().unwrap_or_default(),
        "itn_received"
    );

    let (reference, passphrase) = check_required(config, &notification)?;

    if !verify_signature(&notification, Some(passphrase)) {
        return Err(ItnError::SignatureMismatch);
    }

    info!(reference = reference, "itn_signature_verified");

    let status = notification.payment_status().unwrap_or_default();
    if !notification.is_complete() {
        warn!(
            reference = reference,
            payment_status = status,
            "itn_status_not_complete"
        );
        return Ok(ItnOutcome::Acknowledged {
            reference: reference.to_string(),
            status: status.to_string(),
        });
    }

    validator.validate(raw_body, reference).await?;

    let submission = ConfirmedSubmission::from_notification(
        &notification,
        reference,
        status,
        &config.subject_prefix,
        Utc::now(),
    );

    relay.publish(&submission).await?;

    info!(reference = reference, "itn_forwarded");

    Ok(ItnOutcome::Forwarded {
        reference: reference.to_string(),
    })
}

/// Gate 1: the signature, the reference id and the passphrase must all be present.
fn check_required<'a>(
    config: &'a Config,
    notification: &'a Notification,
) -> Result<(&'a str, &'a str), ItnError> {
    let has_signature = notification.signature().is_some();
    let reference = notification.reference_id();
    let passphrase = config.passphrase.as_deref().filter(|p| !p.is_empty());

    match (has_signature, reference, passphrase) {
        (true, Some(reference), Some(passphrase)) => Ok((reference, passphrase)),
        (_, _, None) => {
            warn!(
                reference = reference.unwrap_or_default(),
                "itn_passphrase_not_configured"
            );
            Err(ItnError::ConfigurationMissing("PAYFAST_PASSPHRASE"))
        }
        (false, _, _) => {
            warn!(
                reference = reference.unwrap_or_default(),
                "itn_missing_signature"
            );
            Err(ItnError::MalformedRequest("missing signature".to_string()))
        }
        (true, None, _) => {
            warn!("itn_missing_reference");
            Err(ItnError::MalformedRequest("missing custom_str1".to_string()))
        }
    }
}
