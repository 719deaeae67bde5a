// Credential hashing and token issuance capabilities.
//
// Services depend on the traits; `Argon2Hasher` and `JwtIssuer` are the
// production implementations.

pub mod jwt;
pub mod password;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::models::User;

pub use jwt::{Claims, JwtIssuer, TokenType};
pub use password::Argon2Hasher;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Expected a {expected} token")]
    WrongTokenType { expected: TokenType },
}

/// Short-lived access token plus longer-lived refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// Salted one-way hashing of raw passwords.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, raw: &str) -> Result<String, AuthError>;

    /// `Ok(false)` on mismatch; `Err` only when `hash` is unreadable.
    fn verify(&self, raw: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Mints and checks bearer credentials bound to a user.
pub trait TokenIssuer: Send + Sync {
    fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError>;

    /// Decode a refresh token and mint a fresh access token from it.
    fn refresh_access(&self, refresh_token: &str) -> Result<(Claims, String), AuthError>;

    fn decode_access(&self, access_token: &str) -> Result<Claims, AuthError>;
}
