//! Relay message types.
//!
//! The JSON keys are human-readable because the relay renders them verbatim
//! into the notification email.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::itn::notification::{
    Notification, FIELD_AMOUNT_FEE, FIELD_EMAIL, FIELD_NAME_FIRST, FIELD_NAME_LAST,
    FIELD_PAYFAST_PAYMENT_ID,
};

/// Placeholder for contact fields the payer left blank.
pub const NOT_AVAILABLE: &str = "N/A";

/// A payment that passed every verification gate.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmedSubmission {
    /// Email subject line
    #[serde(rename = "_subject")]
    pub subject: String,
    /// Payment status (always `COMPLETE`)
    #[serde(rename = "Transaction Status")]
    pub status: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "Last Name")]
    pub last_name: String,
    /// Application reference (`custom_str1`)
    #[serde(rename = "Application Reference ID")]
    pub reference_id: String,
    #[serde(rename = "Amount Paid", skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<String>,
    #[serde(rename = "Payfast Transaction ID", skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(rename = "Confirmation Time", serialize_with = "serialize_iso8601")]
    pub confirmed_at: DateTime<Utc>,
}

impl ConfirmedSubmission {
    /// Build a submission from a verified notification.
    pub fn from_notification(
        notification: &Notification,
        reference_id: &str,
        status: &str,
        subject_prefix: &str,
        confirmed_at: DateTime<Utc>,
    ) -> Self {
        let or_na = |key: &str| {
            notification
                .get_non_empty(key)
                .unwrap_or(NOT_AVAILABLE)
                .to_string()
        };

        Self {
            subject: format!(
                "{} (Payment Confirmed - Ref: {})",
                subject_prefix, reference_id
            ),
            status: status.to_string(),
            email: or_na(FIELD_EMAIL),
            first_name: or_na(FIELD_NAME_FIRST),
            last_name: or_na(FIELD_NAME_LAST),
            reference_id: reference_id.to_string(),
            amount_paid: notification.get(FIELD_AMOUNT_FEE).map(str::to_string),
            transaction_id: notification
                .get(FIELD_PAYFAST_PAYMENT_ID)
                .map(str::to_string),
            confirmed_at,
        }
    }
}

/// `2024-01-31T09:15:00.000Z`
fn serialize_iso8601<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}
