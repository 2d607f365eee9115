//! Core trait definitions.

use async_trait::async_trait;
use crate::errors::Result;
use crate::identifiers::RepositoryRef;
use crate::secret::{EncryptedSecretPayload, PublicKeyMaterial};

/// Remote operations the registrar needs from the hosting platform.
///
/// Implementers talk to the platform's secrets API; tests substitute mocks.
#[async_trait]
pub trait ActionsSecretsService: Send + Sync {
    /// Fetch the repository's current public key for sealing secrets.
    async fn get_repository_public_key(&self, repo: &RepositoryRef) -> Result<PublicKeyMaterial>;

    /// Create or update a repository secret with an already-sealed value.
    async fn submit_encrypted_secret(
        &self,
        repo: &RepositoryRef,
        payload: &EncryptedSecretPayload,
    ) -> Result<()>;
}
