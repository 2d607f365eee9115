//! CLI command implementations.

pub mod register;
