//! Argon2id password hashes, computed on tokio's blocking pool.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use async_trait::async_trait;

use inkwell_core::ports::{AuthError, PasswordService};

/// Argon2id with the crate's default cost parameters. Hashes are PHC
/// strings, so the parameters travel with every stored hash.
#[derive(Clone, Default)]
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self::default()
    }

    fn hash_now(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    fn verify_now(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let stored = PasswordHash::new(stored).map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &stored)
            .is_ok())
    }
}

async fn off_worker<T, F>(work: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AuthError::Hashing(format!("Hashing task failed: {e}")))?
}

#[async_trait]
impl PasswordService for Argon2PasswordService {
    async fn hash(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.clone();
        off_worker(move || hasher.hash_now(&password)).await
    }

    async fn verify(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = self.clone();
        off_worker(move || hasher.verify_now(&password, &hash)).await
    }
}
