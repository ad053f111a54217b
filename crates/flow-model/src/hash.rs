//! Hash construction matching the platform's canonical form:
//! base64-encoded SHA-256 over the message bytes with the salt appended.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Base64-encoded SHA-256 of `bytes`.
#[must_use]
pub fn sha256_base64(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    STANDARD.encode(hasher.finalize())
}

/// The platform's salted hash: `sha256(message || salt)`, base64.
#[must_use]
pub fn hash_with_salt(message: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(message.as_bytes());
    hasher.update(salt.as_bytes());
    STANDARD.encode(hasher.finalize())
}
