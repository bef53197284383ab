use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Distinguishes the two halves of a token pair. A token is only accepted where
/// its own type is expected.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Represents the claims encoded within a JWT.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: i32,
    pub token_type: TokenType,
    /// Unique token id.
    pub jti: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// A freshly issued refresh token and the access token derived from it.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// Signs and verifies HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issues a refresh token for `user_id` and derives an access token from it.
    pub fn issue_pair(&self, user_id: i32) -> Result<TokenPair, AppError> {
        let refresh = self.sign(user_id, TokenType::Refresh, self.refresh_ttl)?;
        let refresh_claims = self.verify(&refresh, TokenType::Refresh)?;
        let access = self.access_from(&refresh_claims)?;
        Ok(TokenPair { refresh, access })
    }

    /// Exchanges a valid refresh token for a new access token.
    pub fn refresh_access(&self, refresh_token: &str) -> Result<String, AppError> {
        let claims = self.verify(refresh_token, TokenType::Refresh)?;
        self.access_from(&claims)
    }

    /// Decodes `token`, checking signature, expiry and type.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)?;

        if claims.token_type != expected {
            return Err(AppError::Unauthorized("Token has wrong type".into()));
        }
        Ok(claims)
    }

    fn access_from(&self, refresh: &Claims) -> Result<String, AppError> {
        self.sign(refresh.sub, TokenType::Access, self.access_ttl)
    }

    fn sign(&self, user_id: i32, token_type: TokenType, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::InternalServerError("Token lifetime overflow".into()))?;

        let claims = Claims {
            sub: user_id,
            token_type,
            jti: Uuid::new_v4(),
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}
