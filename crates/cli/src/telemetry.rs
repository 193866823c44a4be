//! Telemetry initialisation for the `ctr-envelope` binary.
//!
//! Structured JSON logs only, written to stderr so stdout carries nothing but
//! the command's JSON result.
//!
//! # Telemetry invariants
//!
//! - **No key material or plaintext** appears in any log field.
//! - Log level comes from `RUST_LOG` when set, else `CTR_ENVELOPE_LOG_LEVEL`
//!   (default: `info`).

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))
}
