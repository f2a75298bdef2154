//! Argon2id implementation of `PasswordHasher`.
//!
//! Hashes are stored in PHC string format, so the salt and cost parameters
//! travel with each hash and verification needs no extra configuration.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use domains::{DomainError, DomainResult, PasswordHasher};
use tracing::{error, warn};

/// Hashing and verification both run on the blocking pool.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self { params: Params::default() }
    }

    /// Custom cost parameters (e.g., a cheap profile for test suites).
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> DomainResult<String> {
        let password = password.to_owned();
        let argon2 = self.argon2();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .map_err(DomainError::internal)?
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            DomainError::internal(e)
        })
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    async fn verify(&self, password: &str, password_hash: &str) -> DomainResult<bool> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();

        tokio::task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash).map_err(|e| {
                warn!(error = %e, "stored password hash is unreadable");
                DomainError::Corrupt(format!("stored password hash: {e}"))
            })?;
            // Parameters come from the parsed hash, not from `self`.
            Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok())
        })
        .await
        .map_err(DomainError::internal)?
    }
}
