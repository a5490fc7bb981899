//! Server-to-server calls to Payfast.

pub mod validator;

pub use validator::{PayfastValidator, VALID_RESPONSE};
