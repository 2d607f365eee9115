//! Anonymous sealed-box encryption.
//!
//! Wire-compatible with libsodium's `crypto_box_seal`: an ephemeral X25519
//! keypair is generated per call, and the output is the ephemeral public key
//! followed by the XSalsa20-Poly1305 ciphertext, with the nonce derived from
//! both public keys. Only the recipient's secret key can open it, and
//! nothing in the output identifies the sender.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crypto_box::{PublicKey, SecretKey};
use ghsecret_types::{GhSecretError, Result};
use rand::rngs::OsRng;

/// Size of a raw X25519 public key.
pub const KEY_SIZE: usize = crypto_box::KEY_SIZE;

/// Seal `plaintext` for `recipient` and encode the result as padded base64.
pub fn seal(plaintext: &[u8], recipient: &[u8; KEY_SIZE]) -> Result<String> {
    let public = PublicKey::from(*recipient);
    let sealed = public
        .seal(&mut OsRng, plaintext)
        .map_err(|e| GhSecretError::EncryptionFailed(e.to_string()))?;
    Ok(BASE64.encode(sealed))
}

/// Open a base64 sealed box with the recipient's secret key.
pub fn unseal(encoded: &str, recipient: &SecretKey) -> Result<Vec<u8>> {
    let sealed = BASE64
        .decode(encoded)
        .map_err(|e| GhSecretError::Validation(format!("Sealed box is not valid base64: {}", e)))?;
    recipient
        .unseal(&sealed)
        .map_err(|_| GhSecretError::Validation("Sealed box could not be opened".to_string()))
}

/// Decode a base64 public key into exactly [`KEY_SIZE`] bytes.
///
/// Returns a human-readable reason on failure; keys are never padded or
/// truncated.
pub fn decode_public_key(encoded: &str) -> std::result::Result<[u8; KEY_SIZE], String> {
    let raw = BASE64
        .decode(encoded)
        .map_err(|e| format!("invalid base64: {}", e))?;
    <[u8; KEY_SIZE]>::try_from(raw.as_slice())
        .map_err(|_| format!("expected {} bytes, got {}", KEY_SIZE, raw.len()))
}
