//! CLI structure and argument definitions.

use anyhow::Result;
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use ghsecret_core::{Config, Settings};
use ghsecret_types::config::LogFormat;
use ghsecret_types::{LogLevel, RepositoryRef, SecretName};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "register-github-secret")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Seal a secret with each repository's public key and register it as a GitHub Actions secret", long_about = None)]
pub struct Cli {
    /// Secret name
    #[arg(long, value_name = "NAME")]
    pub secret_name: SecretName,

    /// Secret value (prefer the environment variable to keep it out of shell history)
    #[arg(
        long,
        value_name = "VALUE",
        env = "SECRET_VALUE",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub secret_value: String,

    /// Target repositories; repeat the flag or separate with commas
    #[arg(long, value_name = "OWNER/NAME", value_delimiter = ',')]
    pub repos: Vec<RepositoryRef>,

    /// YAML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// GitHub API base URL (for Enterprise)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Log format: json, pretty, or compact
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Enable debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Resolve configuration from file, flags, and environment.
    pub fn settings(&self) -> Result<Settings> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::new(),
        };

        if let Some(api_url) = &self.api_url {
            config.set("github.api_url", api_url)?;
        }
        if let Some(format) = self.log_format {
            config.set("log.format", format)?;
        }
        if self.verbose {
            config.set("log.level", LogLevel::Debug)?;
        } else if self.quiet {
            config.set("log.level", LogLevel::Error)?;
        }

        Ok(config.with_env().resolve()?)
    }

    pub async fn execute(&self, settings: &Settings, cancel: &CancellationToken) -> Result<()> {
        crate::commands::register::execute(
            &self.secret_name,
            &self.secret_value,
            &self.repos,
            settings,
            cancel,
        )
        .await
    }
}
