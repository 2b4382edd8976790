pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Role, User};

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::{AuthMiddleware, RoleGuard};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenError, TokenService};

lazy_static! {
    // Regex for display-name validation: letters, digits, spaces, and a few
    // common punctuation characters.
    static ref NAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9 _'.-]+$").unwrap();
}

/// Name of the http-only cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// An authenticated principal, recovered from a verified access token and
/// attached to the request for the lifetime of that request only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    #[validate(email)]
    pub email: String,
    /// User's password. Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name for the new account.
    /// Must be between 3 and 50 characters.
    #[validate(
        length(min = 3, max = 50),
        regex(
            path = "NAME_REGEX",
            message = "Name contains unsupported characters"
        )
    )]
    pub name: String,
    /// Email address for the new account.
    #[validate(email)]
    pub email: String,
    /// Password for the new account. Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Body form of the refresh-token request. The token may arrive here or in
/// the `refresh_token` cookie; the cookie wins when both are present.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Response structure after successful authentication (login or registration).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    /// Short-lived JWT authorizing individual API calls.
    pub access_token: String,
    /// Long-lived JWT authorizing the minting of new access tokens.
    pub refresh_token: String,
    pub user: User,
}

/// Response of the refresh endpoint: a freshly minted access token.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}
