//! Configuration module for environment variable parsing.
//!
//! Everything is read once at startup into a [`Config`] that is handed to the
//! web server. Secrets are kept optional here; a missing passphrase is
//! reported per request rather than refusing to start.

use std::env;
use tracing::warn;

/// Live Payfast server-to-server validation endpoint.
pub const PAYFAST_VALIDATE_URL: &str = "https://www.payfast.co.za/eng/query/validate";

/// Sandbox Payfast validation endpoint.
pub const PAYFAST_SANDBOX_VALIDATE_URL: &str =
    "https://sandbox.payfast.co.za/eng/query/validate";

const DEFAULT_MERCHANT_ID: &str = "30920829";
const DEFAULT_MERCHANT_KEY: &str = "gqnzkfosq9fc8";
const DEFAULT_SUBJECT_PREFIX: &str = "✅ New NTA Enrollment Application";

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Shared Payfast passphrase used as the signature salt
    pub passphrase: Option<String>,

    /// Form relay endpoint receiving confirmed submissions (Formspree)
    pub relay_endpoint: Option<String>,

    /// Public site base URL
    pub site_base_url: Option<String>,

    /// Public Payfast merchant id
    pub merchant_id: String,

    /// Public Payfast merchant key
    pub merchant_key: String,

    /// Whether the sandbox provider is in use
    pub sandbox: bool,

    /// Provider validation endpoint
    pub validate_url: String,

    /// Prefix for the `_subject` line of relayed submissions
    pub subject_prefix: String,

    /// Outbound HTTP timeout in milliseconds. `None` keeps the client default.
    pub request_timeout_ms: Option<u64>,

    /// Port for the web server to listen on
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let sandbox = parse_bool("PAYFAST_SANDBOX").unwrap_or(false);

        let validate_url = non_empty_var("PAYFAST_VALIDATE_URL").unwrap_or_else(|| {
            if sandbox {
                PAYFAST_SANDBOX_VALIDATE_URL.to_string()
            } else {
                PAYFAST_VALIDATE_URL.to_string()
            }
        });

        Config {
            passphrase: non_empty_var("PAYFAST_PASSPHRASE"),

            relay_endpoint: non_empty_var("FORMSPREE_ENDPOINT"),

            site_base_url: non_empty_var("YOUR_SITE_BASE_URL"),

            merchant_id: non_empty_var("PAYFAST_MERCHANT_ID")
                .unwrap_or_else(|| DEFAULT_MERCHANT_ID.to_string()),

            merchant_key: non_empty_var("PAYFAST_MERCHANT_KEY")
                .unwrap_or_else(|| DEFAULT_MERCHANT_KEY.to_string()),

            sandbox,

            validate_url,

            subject_prefix: non_empty_var("RELAY_SUBJECT_PREFIX")
                .unwrap_or_else(|| DEFAULT_SUBJECT_PREFIX.to_string()),

            request_timeout_ms: parse_number("REQUEST_TIMEOUT_MS"),

            port: parse_number("PORT").unwrap_or(8080),
        }
    }
}

// The passphrase must never reach the logs, even through `{:?}`.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("relay_endpoint", &self.relay_endpoint)
            .field("site_base_url", &self.site_base_url)
            .field("merchant_id", &self.merchant_id)
            .field("merchant_key", &self.merchant_key)
            .field("sandbox", &self.sandbox)
            .field("validate_url", &self.validate_url)
            .field("subject_prefix", &self.subject_prefix)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("port", &self.port)
            .finish()
    }
}

/// Read a variable, treating blank values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a numeric variable, warning when it is present but unparsable.
fn parse_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = non_empty_var(name)?;

    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid number, using default");
            None
        }
    }
}

/// Parse a boolean flag such as "true", "1", "yes".
fn parse_bool(name: &str) -> Option<bool> {
    let raw = non_empty_var(name)?;

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!(env_var = name, value = %raw, "Invalid boolean, using default");
            None
        }
    }
}
