//! Single-repository secret registration.

use crate::seal;
use ghsecret_types::{
    ActionsSecretsService, EncryptedSecretPayload, GhSecretError, PublicKeyMaterial,
    RepositoryRef, Result, SecretName,
};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Span;

/// Registers one secret on one repository.
///
/// Each call fetches the repository's current public key, seals the
/// plaintext with it, and submits the result: one fetch and at most one
/// submit, strictly in that order. Nothing is retried.
///
/// Events are emitted under the span supplied at construction rather than
/// whatever span happens to be current.
#[derive(Clone)]
pub struct Registrar {
    service: Arc<dyn ActionsSecretsService>,
    span: Span,
}

impl Registrar {
    /// Create a registrar logging under a fresh `registrar` span.
    pub fn new(service: Arc<dyn ActionsSecretsService>) -> Self {
        Self::with_span(service, tracing::info_span!("registrar"))
    }

    /// Create a registrar whose events are parented to `span`.
    pub fn with_span(service: Arc<dyn ActionsSecretsService>, span: Span) -> Self {
        Self { service, span }
    }

    /// Register `plaintext` as secret `secret_name` on `repo`.
    ///
    /// Both remote calls race `cancel`; if it fires first the in-flight
    /// request is dropped and `Cancelled` is returned.
    pub async fn register(
        &self,
        cancel: &CancellationToken,
        repo: &RepositoryRef,
        secret_name: &SecretName,
        plaintext: &str,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(GhSecretError::Cancelled);
        }

        let key = until_cancelled(cancel, self.service.get_repository_public_key(repo))
            .await?
            .map_err(|e| GhSecretError::KeyFetchFailed {
                repo: repo.clone(),
                source: Box::new(e),
            })?;

        let payload = self.seal_payload(repo, secret_name, plaintext, key)?;

        until_cancelled(cancel, self.service.submit_encrypted_secret(repo, &payload))
            .await?
            .map_err(|e| GhSecretError::SubmissionFailed {
                repo: repo.clone(),
                source: Box::new(e),
            })?;

        tracing::info!(
            parent: &self.span,
            repo.owner = repo.owner(),
            repo.name = repo.name(),
            secret.name = secret_name.as_str(),
            "set repository secret"
        );
        Ok(())
    }

    /// Decode `key`, seal the plaintext with it, and build the payload.
    ///
    /// Takes the key material by value so it backs exactly one payload.
    fn seal_payload(
        &self,
        repo: &RepositoryRef,
        secret_name: &SecretName,
        plaintext: &str,
        key: PublicKeyMaterial,
    ) -> Result<EncryptedSecretPayload> {
        let raw_key = seal::decode_public_key(&key.key).map_err(|reason| {
            GhSecretError::MalformedPublicKey {
                repo: repo.clone(),
                reason,
            }
        })?;

        let encrypted = seal::seal(plaintext.as_bytes(), &raw_key)?;
        Ok(EncryptedSecretPayload::new(
            secret_name.clone(),
            key.key_id,
            encrypted,
        ))
    }
}

/// Run `fut` unless `cancel` fires first.
async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(GhSecretError::Cancelled),
        out = fut => Ok(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seal::{unseal, KEY_SIZE};
    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use crypto_box::SecretKey;
    use ghsecret_types::FailureStage;
    use mockall::{mock, predicate::eq, Sequence};
    use rand::rngs::OsRng;
    use std::sync::Mutex;

    mock! {
        pub Actions {}

        #[async_trait]
        impl ActionsSecretsService for Actions {
            async fn get_repository_public_key(&self, repo: &RepositoryRef) -> Result<PublicKeyMaterial>;
            async fn submit_encrypted_secret(
                &self,
                repo: &RepositoryRef,
                payload: &EncryptedSecretPayload,
            ) -> Result<()>;
        }
    }

    fn repo() -> RepositoryRef {
        RepositoryRef::new("aereal", "myrepo").unwrap()
    }

    fn secret_name() -> SecretName {
        SecretName::new("MY_SECRET").unwrap()
    }

    fn key_material(sk: &SecretKey) -> PublicKeyMaterial {
        PublicKeyMaterial::new("0xdeadbeaf", BASE64.encode(sk.public_key().as_bytes()))
    }

    #[tokio::test]
    async fn test_register_ok() {
        let sk = SecretKey::generate(&mut OsRng);
        let key = key_material(&sk);
        let submitted = Arc::new(Mutex::new(None));
        let captured = submitted.clone();

        let mut mock = MockActions::new();
        let mut seq = Sequence::new();
        mock.expect_get_repository_public_key()
            .with(eq(repo()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(key.clone()));
        mock.expect_submit_encrypted_secret()
            .withf(|repo, payload| {
                repo.to_string() == "aereal/myrepo"
                    && payload.name().as_str() == "MY_SECRET"
                    && payload.key_id() == "0xdeadbeaf"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, payload| {
                *captured.lock().unwrap() = Some(payload.clone());
                Ok(())
            });

        let registrar = Registrar::new(Arc::new(mock));
        registrar
            .register(&CancellationToken::new(), &repo(), &secret_name(), "blah blah")
            .await
            .unwrap();

        let payload = submitted.lock().unwrap().take().unwrap();
        assert!(!payload.encrypted_value().is_empty());
        assert_eq!(unseal(payload.encrypted_value(), &sk).unwrap(), b"blah blah");
    }

    #[tokio::test]
    async fn test_key_fetch_failure_skips_submission() {
        let mut mock = MockActions::new();
        mock.expect_get_repository_public_key()
            .times(1)
            .returning(|_| Err(GhSecretError::Http("fail: GetRepoPublicKey".to_string())));
        mock.expect_submit_encrypted_secret().never();

        let err = Registrar::new(Arc::new(mock))
            .register(&CancellationToken::new(), &repo(), &secret_name(), "blah blah")
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Some(FailureStage::KeyFetch));
        match err {
            GhSecretError::KeyFetchFailed { repo: failed, source } => {
                assert_eq!(failed, repo());
                assert!(source.to_string().contains("fail: GetRepoPublicKey"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submission_failure() {
        let sk = SecretKey::generate(&mut OsRng);
        let key = key_material(&sk);

        let mut mock = MockActions::new();
        mock.expect_get_repository_public_key()
            .times(1)
            .returning(move |_| Ok(key.clone()));
        mock.expect_submit_encrypted_secret()
            .times(1)
            .returning(|_, _| {
                Err(GhSecretError::Service {
                    status: 500,
                    message: "fail: CreateOrUpdateRepoSecret".to_string(),
                })
            });

        let err = Registrar::new(Arc::new(mock))
            .register(&CancellationToken::new(), &repo(), &secret_name(), "blah blah")
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Some(FailureStage::Submission));
        assert!(err.to_string().contains("fail: CreateOrUpdateRepoSecret"));
    }

    #[tokio::test]
    async fn test_malformed_keys_never_submit() {
        let malformed = [
            "%%% not base64 %%%".to_string(),
            BASE64.encode([1u8; KEY_SIZE - 1]),
            BASE64.encode([1u8; KEY_SIZE + 1]),
            String::new(),
        ];

        for encoded in malformed {
            let mut mock = MockActions::new();
            mock.expect_get_repository_public_key()
                .times(1)
                .returning(move |_| Ok(PublicKeyMaterial::new("0xdeadbeaf", encoded.clone())));
            mock.expect_submit_encrypted_secret().never();

            let err = Registrar::new(Arc::new(mock))
                .register(&CancellationToken::new(), &repo(), &secret_name(), "blah blah")
                .await
                .unwrap_err();

            assert!(
                matches!(err, GhSecretError::MalformedPublicKey { .. }),
                "unexpected error: {:?}",
                err
            );
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_fetch() {
        let mut mock = MockActions::new();
        mock.expect_get_repository_public_key().never();
        mock.expect_submit_encrypted_secret().never();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = Registrar::new(Arc::new(mock))
            .register(&cancel, &repo(), &secret_name(), "blah blah")
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
