//! Payfast Instant Transaction Notification (ITN) primitives.
//!
//! - [`notification`]: decoding the form-encoded ITN body
//! - [`signature`]: the canonical parameter string and its MD5 checksum

pub mod notification;
pub mod signature;

pub use notification::{Notification, PAYMENT_STATUS_COMPLETE};
pub use signature::{canonical_string, generate_signature, verify_signature};
