//! # ghsecret types
//!
//! Core types, traits, and errors shared across the register-github-secret
//! crates.
//!
//! This crate provides:
//!
//! - Type-safe repository references and secret names
//! - Public key material, encrypted payloads, and registration outcomes
//! - The remote secrets service trait the registrar depends on
//! - Error types and result aliases
//!
//! ## Example
//!
//! ```
//! use ghsecret_types::{RepositoryRef, SecretName};
//!
//! let repo: RepositoryRef = "aereal/myrepo".parse().unwrap();
//! assert_eq!(repo.owner(), "aereal");
//!
//! let name = SecretName::new("MY_SECRET").unwrap();
//! assert_eq!(name.as_str(), "MY_SECRET");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod identifiers;
pub mod enums;
pub mod secret;
pub mod traits;
pub mod config;

// Re-export common types for convenience
pub use errors::{GhSecretError, Result};
pub use identifiers::{RepositoryRef, SecretName};
pub use enums::{FailureStage, LogLevel};
pub use secret::{EncryptedSecretPayload, PublicKeyMaterial, RegistrationOutcome};
pub use traits::ActionsSecretsService;
