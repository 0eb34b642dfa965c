//! Password hashing and token/device-id generation.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{AuthError, AuthResult};

/// Hashes a password for storage.
///
/// # Errors
///
/// Returns a decode-style error if hashing fails (should not happen with a
/// well-formed password).
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            AuthError::Domain(palaver_core::DomainError::decode(format!(
                "password hash: {e}"
            )))
        })
}

/// Verifies a password against a stored hash.
///
/// A missing or malformed hash verifies as false rather than erroring;
/// federated accounts have no password hash and can never sign in with one.
#[must_use]
pub fn verify_password(password: &str, hash: Option<&str>) -> bool {
    let Some(hash) = hash else {
        return false;
    };
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Generates a fresh bearer token: 32 random bytes, hex-encoded.
#[must_use]
pub fn new_bearer_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generates a hashed device identifier from a random seed.
#[must_use]
pub fn new_device_id() -> String {
    let seed = Uuid::new_v4();
    hex::encode(Sha256::digest(seed.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", Some(&hash)));
        assert!(!verify_password("hunter3", Some(&hash)));
    }

    #[test]
    fn test_missing_or_malformed_hash_never_verifies() {
        assert!(!verify_password("hunter2", None));
        assert!(!verify_password("hunter2", Some("not-a-hash")));
    }

    #[test]
    fn test_token_and_device_id_shapes() {
        let token = new_bearer_token();
        assert_eq!(token.len(), 64);
        assert_ne!(token, new_bearer_token());

        let device = new_device_id();
        assert_eq!(device.len(), 64);
        assert_ne!(device, new_device_id());
    }
}
