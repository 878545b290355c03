//! Credential ports: bearer tokens and password hashes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Author;

/// What a verified bearer token says about its holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub author_id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

/// A freshly signed bearer token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

/// Signs and checks bearer tokens.
pub trait TokenService: Send + Sync {
    /// Sign a token carrying the author's id, email and roles.
    fn issue(&self, author: &Author) -> Result<IssuedToken, AuthError>;

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Password hashing. Both operations are CPU-bound and must not run on a
/// request worker thread.
#[async_trait]
pub trait PasswordService: Send + Sync {
    async fn hash(&self, password: String) -> Result<String, AuthError>;

    /// `Ok(false)` for a wrong password; `Err` only when the stored hash
    /// cannot be used.
    async fn verify(&self, password: String, hash: String) -> Result<bool, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
