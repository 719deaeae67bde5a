use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{AuthError, TokenIssuer, TokenPair};
use crate::config::SecurityConfig;
use crate::database::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub mobile_number: String,
    pub token_type: TokenType,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    fn new(
        user_id: i64,
        mobile_number: &str,
        token_type: TokenType,
        issuer: &str,
        lifetime: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            mobile_number: mobile_number.to_string(),
            token_type,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            iss: issuer.to_string(),
        }
    }

    pub fn user_id(&self) -> Result<i64, AuthError> {
        self.sub
            .parse()
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_string()))
    }
}

/// HS256 tokens signed with the configured secret.
pub struct JwtIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl JwtIssuer {
    pub fn new(
        secret: &str,
        issuer: impl Into<String>,
        access_lifetime: Duration,
        refresh_lifetime: Duration,
    ) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            access_lifetime,
            refresh_lifetime,
        })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, AuthError> {
        Self::new(
            &config.jwt_secret,
            config.jwt_issuer.clone(),
            Duration::minutes(config.access_token_minutes),
            Duration::days(config.refresh_token_days),
        )
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    fn decode_as(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?
            .claims;

        if claims.token_type != expected {
            return Err(AuthError::WrongTokenType { expected });
        }
        Ok(claims)
    }

    fn access_for(&self, user_id: i64, mobile_number: &str) -> Result<String, AuthError> {
        self.sign(&Claims::new(
            user_id,
            mobile_number,
            TokenType::Access,
            &self.issuer,
            self.access_lifetime,
        ))
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        let refresh = self.sign(&Claims::new(
            user.id,
            &user.mobile_number,
            TokenType::Refresh,
            &self.issuer,
            self.refresh_lifetime,
        ))?;
        let access = self.access_for(user.id, &user.mobile_number)?;
        Ok(TokenPair { refresh, access })
    }

    fn refresh_access(&self, refresh_token: &str) -> Result<(Claims, String), AuthError> {
        let claims = self.decode_as(refresh_token, TokenType::Refresh)?;
        let access = self.access_for(claims.user_id()?, &claims.mobile_number)?;
        Ok((claims, access))
    }

    fn decode_access(&self, access_token: &str) -> Result<Claims, AuthError> {
        self.decode_as(access_token, TokenType::Access)
    }
}
