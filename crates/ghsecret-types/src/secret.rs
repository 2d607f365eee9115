//! Key material, encrypted payloads, and registration outcomes.

use serde::{Deserialize, Serialize};
use crate::errors::{GhSecretError, Result};
use crate::identifiers::SecretName;

/// A repository's current public key as served by the remote platform.
///
/// The key is kept in its transport form (standard base64) and is decoded
/// only when a secret is sealed with it. Material is fetched immediately
/// before each registration and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyMaterial {
    /// Opaque key identifier, echoed back on submission
    pub key_id: String,
    /// Base64-encoded raw public key
    pub key: String,
}

impl PublicKeyMaterial {
    /// Create key material from its identifier and base64 key.
    pub fn new(key_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key: key.into(),
        }
    }
}

/// An encrypted secret ready to be submitted.
///
/// Immutable once built; all three fields serialize as flat strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSecretPayload {
    name: SecretName,
    key_id: String,
    encrypted_value: String,
}

impl EncryptedSecretPayload {
    /// Build a payload from a secret name, the sealing key's identifier,
    /// and the base64 ciphertext.
    pub fn new(name: SecretName, key_id: impl Into<String>, encrypted_value: impl Into<String>) -> Self {
        Self {
            name,
            key_id: key_id.into(),
            encrypted_value: encrypted_value.into(),
        }
    }

    /// Secret name the value is registered under.
    pub fn name(&self) -> &SecretName {
        &self.name
    }

    /// Identifier of the key the value was sealed with.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Base64-encoded sealed-box ciphertext.
    pub fn encrypted_value(&self) -> &str {
        &self.encrypted_value
    }
}

/// Result of one (repository, secret) registration attempt.
#[derive(Debug)]
pub enum RegistrationOutcome {
    /// The secret was submitted
    Registered,
    /// The attempt failed
    Failed(GhSecretError),
}

impl From<Result<()>> for RegistrationOutcome {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => RegistrationOutcome::Registered,
            Err(err) => RegistrationOutcome::Failed(err),
        }
    }
}
