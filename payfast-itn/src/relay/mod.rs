//! Relay module for forwarding confirmed payments.
//!
//! ## Flow
//!
//! ```text
//! verified Notification → ConfirmedSubmission → RelayPublisher → form relay (Formspree)
//! ```

pub mod publisher;
pub mod types;

pub use publisher::RelayPublisher;
pub use types::{ConfirmedSubmission, NOT_AVAILABLE};
