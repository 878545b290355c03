//! HS256 bearer tokens for authors.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use inkwell_core::domain::Author;
use inkwell_core::ports::{AuthError, IssuedToken, TokenClaims, TokenService};

/// Secret used when none is configured.
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_JWT_SECRET.to_string(),
            expiration_hours: 24,
            issuer: "inkwell-api".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }

    fn lifetime(&self) -> TimeDelta {
        TimeDelta::hours(self.expiration_hours)
    }
}

/// The token payload on the wire.
#[derive(Debug, Serialize, Deserialize)]
struct AuthorClaims {
    sub: Uuid,
    email: String,
    roles: Vec<String>,
    iat: i64,
    exp: i64,
    iss: String,
}

/// Signs author tokens with a shared secret. Only HS256 tokens from the
/// configured issuer that carry `sub`, `exp` and `iss` are accepted.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["sub", "exp", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }
}

fn rejected(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken(err.to_string()),
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, author: &Author) -> Result<IssuedToken, AuthError> {
        let issued_at = Utc::now();
        let lifetime = self.config.lifetime();

        let claims = AuthorClaims {
            sub: author.id,
            email: author.email.clone(),
            roles: author.roles(),
            iat: issued_at.timestamp(),
            exp: (issued_at + lifetime).timestamp(),
            iss: self.config.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_in: lifetime.num_seconds().max(0) as u64,
        })
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let claims = decode::<AuthorClaims>(token, &self.decoding_key, &self.validation)
            .map_err(rejected)?
            .claims;

        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::InvalidToken("Expiry out of range".to_string()))?;

        Ok(TokenClaims {
            author_id: claims.sub,
            email: claims.email,
            roles: claims.roles,
            expires_at,
        })
    }
}
