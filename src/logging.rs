//! Tracing setup for the binary
//!
//! `RUST_LOG` wins when set. Otherwise the level follows the `-v` count:
//! warn, info, then debug. Output goes to stderr so command output on
//! stdout can be piped.

use tracing_subscriber::EnvFilter;

use crate::error::FieldLogError;

/// Filter directive for a `-v` count
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

pub fn init_tracing(verbosity: u8) -> Result<(), FieldLogError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| FieldLogError::Config(format!("Failed to initialize logging: {}", e)))
}
