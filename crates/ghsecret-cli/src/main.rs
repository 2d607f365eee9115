//! register-github-secret entry point.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use ghsecret_core::Settings;
use std::io::IsTerminal;
use tokio_util::sync::CancellationToken;

mod cli;
mod commands;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Without settings there is no logger yet, so report directly.
    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    if let Err(e) = ghsecret_core::log::init(&settings.log) {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }

    match run(&cli, &settings).await {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!(
                error.message = %e,
                error.kind = ghsecret_core::log::error_kind(e.as_ref()),
                "Run failed"
            );
            if std::io::stderr().is_terminal() {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; cancelling registrations");
            on_interrupt.cancel();
        }
    });

    cli.execute(settings, &cancel).await
}
