//! # ghsecret core
//!
//! Configuration management and logging for register-github-secret.
//!
//! This crate provides:
//!
//! - **Configuration**: Multi-layer configuration (defaults, file, flags, environment)
//! - **Logging**: Structured logging to stderr in JSON, pretty, or compact form
//!
//! ## Example
//!
//! ```no_run
//! use ghsecret_core::config::Config;
//!
//! let settings = Config::new().with_env().resolve()?;
//! ghsecret_core::log::init(&settings.log)?;
//! # Ok::<(), ghsecret_types::GhSecretError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod log;

// Re-export commonly used items
pub use config::{Config, Settings};
pub use ghsecret_types::{GhSecretError, Result};
