//! Concurrent registration across many repositories.
//!
//! Fail-fast: the first failure cancels every registration still in flight,
//! all tasks are joined, and the caller receives that one failure wrapped in
//! `AggregateFailure`. Per-repository failures are logged as they settle.

use crate::registrar::Registrar;
use ghsecret_types::{GhSecretError, RegistrationOutcome, RepositoryRef, Result, SecretName};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Runs one [`Registrar`] call per distinct repository, concurrently.
#[derive(Clone)]
pub struct FanOut {
    registrar: Registrar,
}

impl FanOut {
    /// Create a coordinator around `registrar`.
    pub fn new(registrar: Registrar) -> Self {
        Self { registrar }
    }

    /// Register `plaintext` as `secret_name` on every repository in `repos`.
    ///
    /// Duplicate repositories collapse to a single registration. An empty
    /// input succeeds without any remote call. Cancelling `cancel` cancels
    /// every registration; the coordinator still waits for all of them to
    /// return before reporting.
    pub async fn register_many<I>(
        &self,
        cancel: &CancellationToken,
        repos: I,
        secret_name: &SecretName,
        plaintext: &str,
    ) -> Result<()>
    where
        I: IntoIterator<Item = RepositoryRef>,
    {
        let targets: HashSet<RepositoryRef> = repos.into_iter().collect();
        if targets.is_empty() {
            return Ok(());
        }

        let total = targets.len();
        let group = cancel.child_token();
        let plaintext: Arc<str> = Arc::from(plaintext);

        let mut tasks = JoinSet::new();
        let mut task_repos = HashMap::with_capacity(total);
        for repo in targets {
            let registrar = self.registrar.clone();
            let group = group.clone();
            let secret_name = secret_name.clone();
            let plaintext = Arc::clone(&plaintext);
            let task_repo = repo.clone();

            let handle = tasks.spawn(async move {
                let result = registrar.register(&group, &repo, &secret_name, &plaintext).await;
                if result.is_err() {
                    group.cancel();
                }
                (repo, RegistrationOutcome::from(result))
            });
            task_repos.insert(handle.id(), task_repo);
        }

        let mut first_failure: Option<(RepositoryRef, GhSecretError)> = None;
        let mut first_cancelled: Option<(RepositoryRef, GhSecretError)> = None;
        let mut failed = 0;

        while let Some(joined) = tasks.join_next().await {
            let (repo, outcome) = match joined {
                Ok(settled) => settled,
                Err(join_err) => {
                    group.cancel();
                    let Some(repo) = task_repos.remove(&join_err.id()) else {
                        continue;
                    };
                    let err = GhSecretError::Other(format!("registration task for {} failed: {}", repo, join_err));
                    (repo, RegistrationOutcome::Failed(err))
                }
            };

            let RegistrationOutcome::Failed(err) = outcome else {
                continue;
            };

            if err.is_cancelled() {
                tracing::debug!(repo.owner = repo.owner(), repo.name = repo.name(), "registration cancelled");
                first_cancelled.get_or_insert((repo, err));
                continue;
            }

            failed += 1;
            tracing::warn!(
                repo.owner = repo.owner(),
                repo.name = repo.name(),
                secret.name = secret_name.as_str(),
                stage = %err.stage().map_or_else(|| "none".to_string(), |s| s.to_string()),
                error.message = %err,
                error.kind = err.kind(),
                "repository secret registration failed"
            );
            first_failure.get_or_insert((repo, err));
        }

        match first_failure.or(first_cancelled) {
            None => Ok(()),
            Some((repo, source)) => Err(GhSecretError::AggregateFailure {
                repo,
                failed,
                total,
                source: Box::new(source),
            }),
        }
    }
}
