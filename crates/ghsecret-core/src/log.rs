//! Logging setup.
//!
//! Events go to stderr so stdout stays free for command output. The JSON
//! format is the default; errors are reported as flat `error.message` and
//! `error.kind` fields rather than as nested objects.

use ghsecret_types::config::{LogConfig, LogFormat};
use ghsecret_types::{GhSecretError, Result};
use std::error::Error as StdError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging from configuration.
///
/// `RUST_LOG`, when set, takes precedence over the configured level.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| GhSecretError::Other(format!("Failed to initialize logging: {}", e)))
}

/// The `error.kind` tag for an error chain.
///
/// Walks the chain and reports the first `GhSecretError` found, or
/// `"unknown"` when the chain holds none.
pub fn error_kind(err: &(dyn StdError + 'static)) -> &'static str {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(ours) = e.downcast_ref::<GhSecretError>() {
            return ours.kind();
        }
        current = e.source();
    }
    "unknown"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrapper(GhSecretError);

    impl std::fmt::Display for Wrapper {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "wrapped")
        }
    }

    impl StdError for Wrapper {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_error_kind_direct() {
        let err = GhSecretError::MissingToken;
        assert_eq!(error_kind(&err), "missing_token");
    }

    #[test]
    fn test_error_kind_through_chain() {
        let err = Wrapper(GhSecretError::Cancelled);
        assert_eq!(error_kind(&err), "cancelled");
    }

    #[test]
    fn test_error_kind_unknown() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(error_kind(&err), "unknown");
    }
}
