//! Logging setup.
//!
//! Logs are written to stderr: when serving over stdio, stdout carries the
//! protocol and must stay clean.

use tracing_subscriber::EnvFilter;

/// Initialize tracing output to stderr, filtered by `RUST_LOG`.
///
/// Defaults to `info` when `RUST_LOG` is unset. Calling this twice is an
/// error from the subscriber; embedders that install their own subscriber
/// should skip it.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
