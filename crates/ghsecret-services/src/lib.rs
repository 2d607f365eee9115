//! # ghsecret services
//!
//! External service client implementations.
//!
//! This crate provides an async client for the **GitHub** Actions secrets
//! API, implementing [`ghsecret_types::ActionsSecretsService`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod github;

pub use github::{GithubClient, GithubConfig};
