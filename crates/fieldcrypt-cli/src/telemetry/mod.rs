//! Telemetry initialisation for the `fieldcrypt` command.
//!
//! Structured JSON logs only, written to **stderr**: stdout is reserved for
//! the encrypted or decrypted value so the command composes in pipelines.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialise the tracing subscriber for the command.
///
/// Outputs structured JSON logs to stderr at the configured log level; the
/// `RUST_LOG` environment variable takes precedence when set.
///
/// # Errors
///
/// Returns an error if the subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise fieldcrypt tracing subscriber: {e}"))
}
