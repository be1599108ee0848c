//! Password Hashing
//!
//! Argon2id hashing with configurable cost. Verification never fails on a
//! malformed digest; it simply reports a mismatch.

use crate::error::AuthError;

use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Argon2id credential hasher
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    /// Digest of a random password, verified against when a user does not exist
    dummy_digest: String,
}

impl CredentialHasher {
    /// Create a hasher with the given cost parameters
    pub fn new(params: Params) -> Result<Self, AuthError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut filler = [0u8; 32];
        OsRng.fill_bytes(&mut filler);
        let salt = SaltString::generate(&mut OsRng);
        let dummy_digest = argon2.hash_password(&filler, &salt)?.to_string();

        Ok(Self {
            argon2,
            dummy_digest,
        })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string();

        Ok(hash)
    }

    /// Verify a password against a PHC-format digest
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        let parsed_hash = match PasswordHash::new(digest) {
            Ok(h) => h,
            Err(_) => return false,
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Run a verification that always fails but costs the same as a real one
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.dummy_digest);
        false
    }

    /// Hash on the blocking pool so request tasks keep running
    pub async fn hash_async(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| {
                tracing::error!("Password hashing task failed: {}", e);
                AuthError::Internal
            })?
    }

    /// Verify on the blocking pool; `None` digests take the dummy path
    pub async fn verify_async(&self, password: String, digest: Option<String>) -> Result<bool, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || match digest {
            Some(digest) => hasher.verify(&password, &digest),
            None => hasher.verify_dummy(&password),
        })
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {}", e);
            AuthError::Internal
        })
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}
