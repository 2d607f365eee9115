//! # ghsecret secrets
//!
//! Sealing and registration of repository secrets.
//!
//! This crate provides:
//! - **seal**: libsodium-compatible anonymous sealed boxes
//! - **registrar**: fetch key, seal, and submit for a single repository
//! - **fanout**: concurrent, deduplicated, fail-fast registration across repositories
//!
//! ## Example
//!
//! ```no_run
//! use ghsecret_secrets::{FanOut, Registrar};
//! use ghsecret_services::{GithubClient, GithubConfig};
//! use ghsecret_types::{RepositoryRef, SecretName};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> ghsecret_types::Result<()> {
//! let client = GithubClient::new(GithubConfig::default())?;
//! let fanout = FanOut::new(Registrar::new(Arc::new(client)));
//!
//! let repos: Vec<RepositoryRef> = vec!["aereal/repo1".parse()?, "aereal/repo2".parse()?];
//! fanout
//!     .register_many(&CancellationToken::new(), repos, &SecretName::new("MY_SECRET")?, "s3cr3t")
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod seal;
pub mod registrar;
pub mod fanout;

pub use fanout::FanOut;
pub use registrar::Registrar;
