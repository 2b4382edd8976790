use crate::config::AuthConfig;
use crate::error::AppError;
use crate::models::Role;
use chrono::Duration;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Represents the claims encoded within a JWT (JSON Web Token).
///
/// Access and refresh tokens share this claim shape; they differ only in
/// signing secret and lifetime.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: Uuid,
    /// Privilege tier of the subject, carried so authorization can run
    /// without a store lookup.
    pub role: Role,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Why a presented token failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Correctly signed but past its expiration.
    Expired,
    /// Signature does not match the expected secret. Also produced when an
    /// access token is presented where a refresh token is expected (or vice
    /// versa), since the two secrets are disjoint.
    InvalidSignature,
    /// Structurally not a decodable token.
    Malformed,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::InvalidSignature => write!(f, "invalid token signature"),
            TokenError::Malformed => write!(f, "malformed token"),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        AppError::Forbidden(format!("Invalid or expired token: {}", error))
    }
}

fn classify(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    }
}

/// Issues and verifies access and refresh tokens.
///
/// Both signing secrets are injected at construction rather than read from the
/// environment, so tests can build services with distinct secrets per
/// scenario. Issuance is a pure function of identity, current time, and
/// secret; nothing is cached or persisted, and there is no revocation list:
/// an issued token stays valid until its own expiry.
#[derive(Clone)]
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.access_secret,
            &config.refresh_secret,
            Duration::minutes(config.access_ttl_minutes),
            Duration::days(config.refresh_ttl_days),
        )
    }

    /// Lifetime of refresh tokens, used for the refresh cookie's max-age.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Generates a short-lived access token for the given user.
    pub fn issue_access_token(&self, user_id: Uuid, role: Role) -> Result<String, AppError> {
        self.issue(user_id, role, self.access_ttl, &self.access_encoding)
    }

    /// Generates a long-lived refresh token for the given user.
    pub fn issue_refresh_token(&self, user_id: Uuid, role: Role) -> Result<String, AppError> {
        self.issue(user_id, role, self.refresh_ttl, &self.refresh_encoding)
    }

    fn issue(
        &self,
        user_id: Uuid,
        role: Role,
        ttl: Duration,
        key: &EncodingKey,
    ) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?;

        let claims = Claims {
            sub: user_id,
            role,
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token against the access secret and decodes its claims.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        Self::verify(token, &self.access_decoding)
    }

    /// Verifies a token against the refresh secret and decodes its claims.
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        Self::verify(token, &self.refresh_decoding)
    }

    fn verify(token: &str, key: &DecodingKey) -> Result<Claims, TokenError> {
        decode::<Claims>(token, key, &Validation::default())
            .map(|data| data.claims)
            .map_err(classify)
    }
}
