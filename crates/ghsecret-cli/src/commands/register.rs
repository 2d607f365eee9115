//! Secret registration command.

use anyhow::Result;
use ghsecret_core::Settings;
use ghsecret_secrets::{FanOut, Registrar};
use ghsecret_services::{GithubClient, GithubConfig};
use ghsecret_types::{GhSecretError, RepositoryRef, SecretName};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub async fn execute(
    secret_name: &SecretName,
    secret_value: &str,
    repos: &[RepositoryRef],
    settings: &Settings,
    cancel: &CancellationToken,
) -> Result<()> {
    if repos.is_empty() {
        tracing::info!(secret.name = secret_name.as_str(), "no repositories given; nothing to register");
        return Ok(());
    }

    if settings.github.token.is_none() {
        return Err(GhSecretError::MissingToken.into());
    }

    let client = GithubClient::new(GithubConfig::from(&settings.github))?;
    let span = tracing::info_span!("register", secret.name = secret_name.as_str());
    let fanout = FanOut::new(Registrar::with_span(Arc::new(client), span));

    fanout
        .register_many(cancel, repos.iter().cloned(), secret_name, secret_value)
        .await?;

    Ok(())
}
