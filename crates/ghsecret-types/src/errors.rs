//! Error types for secret registration.

use crate::enums::FailureStage;
use crate::identifiers::RepositoryRef;
use thiserror::Error;

/// The main error type for register-github-secret operations.
///
/// The first five variants form the registration taxonomy: each one names
/// the pipeline stage that failed, so a caller can tell transient network
/// failures apart from configuration problems such as a malformed key.
/// The rest are the underlying causes those variants wrap, plus the
/// validation and configuration failures of the surrounding tool.
#[derive(Error, Debug)]
pub enum GhSecretError {
    /// Fetching the repository public key failed
    #[error("Failed to fetch public key for {repo}: {source}")]
    KeyFetchFailed {
        /// Repository whose key was requested
        repo: RepositoryRef,
        /// Underlying transport or service error
        #[source]
        source: Box<GhSecretError>,
    },

    /// The public key could not be decoded into exactly 32 bytes
    #[error("Malformed public key for {repo}: {reason}")]
    MalformedPublicKey {
        /// Repository that served the key
        repo: RepositoryRef,
        /// What was wrong with the key
        reason: String,
    },

    /// Sealed-box encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Submitting the encrypted secret failed
    #[error("Failed to submit secret to {repo}: {source}")]
    SubmissionFailed {
        /// Repository the secret was submitted to
        repo: RepositoryRef,
        /// Underlying transport or service error
        #[source]
        source: Box<GhSecretError>,
    },

    /// One or more repositories failed during a fan-out registration
    #[error("Registration failed for {failed} of {total} repositories: {source}")]
    AggregateFailure {
        /// Repository of the first failure observed
        repo: RepositoryRef,
        /// Number of repositories that failed for a reason other than cancellation
        failed: usize,
        /// Number of distinct repositories dispatched
        total: usize,
        /// First failure, in completion order
        #[source]
        source: Box<GhSecretError>,
    },

    /// Remote API answered with a non-success status
    #[error("GitHub API error ({status}): {message}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The operation observed cancellation before completing
    #[error("Operation cancelled")]
    Cancelled,

    /// No API token is available
    #[error("missing GitHub token")]
    MissingToken,

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl GhSecretError {
    /// The registration stage this error originated from.
    ///
    /// Aggregate failures report the stage of the failure they wrap.
    /// Errors raised outside the registration pipeline have no stage.
    pub fn stage(&self) -> Option<FailureStage> {
        match self {
            Self::KeyFetchFailed { .. } => Some(FailureStage::KeyFetch),
            Self::MalformedPublicKey { .. } => Some(FailureStage::MalformedKey),
            Self::EncryptionFailed(_) => Some(FailureStage::Encryption),
            Self::SubmissionFailed { .. } => Some(FailureStage::Submission),
            Self::Cancelled => Some(FailureStage::Cancelled),
            Self::AggregateFailure { source, .. } => source.stage(),
            _ => None,
        }
    }

    /// Stable snake_case tag used as the `error.kind` log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeyFetchFailed { .. } => "key_fetch_failed",
            Self::MalformedPublicKey { .. } => "malformed_public_key",
            Self::EncryptionFailed(_) => "encryption_failed",
            Self::SubmissionFailed { .. } => "submission_failed",
            Self::AggregateFailure { .. } => "aggregate_failure",
            Self::Service { .. } => "service",
            Self::Http(_) => "http",
            Self::Cancelled => "cancelled",
            Self::MissingToken => "missing_token",
            Self::Validation(_) => "validation",
            Self::Config(_) => "config",
            Self::Other(_) => "other",
        }
    }

    /// Whether this error only reports that the operation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A specialized Result type for register-github-secret operations.
pub type Result<T> = std::result::Result<T, GhSecretError>;

/// Helper macro to bail out with a GhSecretError
///
/// This is used for expected error conditions.
///
/// # Example
///
/// ```ignore
/// if !valid {
///     bail!(Validation, "Invalid secret name: {}", name);
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($variant:ident, $msg:expr) => {
        return Err($crate::GhSecretError::$variant($msg.to_string()))
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::GhSecretError::$variant(format!($fmt, $($arg)*)))
    };
    ($msg:expr) => {
        return Err($crate::GhSecretError::Other($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::GhSecretError::Other(format!($fmt, $($arg)*)))
    };
}
