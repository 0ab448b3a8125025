//! Tracing setup for the command-line binary.
//!
//! Logs go to stderr so the feature record on stdout stays machine-readable.
//! `RUST_LOG` takes precedence over the verbosity flag.

use tracing_subscriber::{fmt, EnvFilter};

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter directive: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(String),
}

pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "voiceprops=debug,info"
    } else {
        "warn"
    }
}

/// Install a global fmt subscriber writing to stderr.
pub fn init(verbose: bool) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive(verbose))?,
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| LoggingError::SetGlobal(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse() {
        for verbose in [false, true] {
            assert!(EnvFilter::try_new(default_directive(verbose)).is_ok());
        }
    }
}
