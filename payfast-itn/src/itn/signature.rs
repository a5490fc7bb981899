//! Payfast ITN signature verification.
//!
//! Payfast signs notifications with an MD5 digest over the sorted,
//! URI-component-encoded parameter string, salted with the merchant
//! passphrase. MD5 is dictated by the provider protocol.
//! Reference: https://developers.payfast.co.za/docs#step_4_confirm_payment

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::warn;

use super::notification::{Notification, FIELD_SIGNATURE};

/// Characters left unescaped by URI-component encoding:
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encode a value the way the provider does, with spaces as `+`.
fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT)
        .to_string()
        .replace("%20", "+")
}

/// Whitespace stripped from values before encoding: Unicode whitespace plus
/// the byte order mark, but not NEL (U+0085), matching the provider's trim.
fn is_trimmed(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{FEFF}'
}

/// Values that never take part in the signature.
fn is_excluded(value: &str) -> bool {
    value.is_empty() || value == "true" || value == "false"
}

/// Build the canonical parameter string for a notification.
///
/// Keys are taken in lexicographic order. `signature` is skipped, as is any
/// field whose raw value is empty, `"true"` or `"false"`. Included values are
/// trimmed before encoding. A non-empty passphrase is appended last.
pub fn canonical_string(notification: &Notification, passphrase: Option<&str>) -> String {
    let mut out = String::new();

    for (key, value) in notification.iter() {
        if key == FIELD_SIGNATURE || is_excluded(value) {
            continue;
        }
        out.push_str(key);
        out.push('=');
        out.push_str(&encode_component(value.trim_matches(is_trimmed)));
        out.push('&');
    }

    if out.ends_with('&') {
        out.pop();
    }

    if let Some(passphrase) = passphrase.filter(|p| !p.is_empty()) {
        out.push_str("&passphrase=");
        out.push_str(&encode_component(passphrase));
    }

    out
}

/// Lowercase hex MD5 of the canonical parameter string.
pub fn generate_signature(notification: &Notification, passphrase: Option<&str>) -> String {
    let canonical = canonical_string(notification, passphrase);
    hex::encode(md5::compute(canonical.as_bytes()).0)
}

/// Verify a notification's `signature` field against the recomputed checksum.
///
/// The received value is compared exactly; a missing signature never verifies.
pub fn verify_signature(notification: &Notification, passphrase: Option<&str>) -> bool {
    let received = match notification.signature() {
        Some(s) => s,
        None => {
            warn!("itn_signature_missing");
            return false;
        }
    };

    let expected = generate_signature(notification, passphrase);
    let valid = expected == received;

    if !valid {
        warn!(
            reference = notification.reference_id().unwrap_or_default(),
            expected_length = expected.len(),
            actual_length = received.len(),
            "itn_signature_mismatch"
        );
    }

    valid
}
