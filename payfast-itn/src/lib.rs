//! Payfast ITN receiver.
//!
//! Verifies Payfast Instant Transaction Notifications and forwards confirmed
//! payments to a form relay service. The `payfast-itn-web` binary serves the
//! webhook; everything it needs lives in this library.
//!
//! ## Flow
//!
//! ```text
//! Payfast ITN → signature check → status check → Payfast validate → form relay
//! ```

pub mod config;
pub mod error;
pub mod itn;
pub mod payfast;
pub mod process;
pub mod relay;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::ItnError;
pub use itn::{canonical_string, generate_signature, verify_signature, Notification};
pub use payfast::PayfastValidator;
pub use process::{process_notification, ItnOutcome};
pub use relay::{ConfirmedSubmission, RelayPublisher};
pub use web::{build_router, AppState};
