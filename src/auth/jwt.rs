use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::users::Roles;

/// Claims carried by the bearer tokens the identity provider issues.
///
/// `sub` is the user's UUID. `user_metadata` holds profile details from the
/// OAuth provider and is only used the first time a user is seen.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    pub iat: Option<usize>,
    pub iss: Option<String>,
    pub email: Option<String>,
    /// `"admin"` provisions an administrator; anything else a regular user.
    pub role: Option<String>,
    pub user_metadata: Option<UserMetadata>,
}

/// Metadata populated by the OAuth provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserMetadata {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub user_name: Option<String>,
    pub avatar_url: Option<String>,
    pub picture: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
}

impl Claims {
    /// Extract the user UUID from the `sub` claim.
    pub fn user_id(&self) -> Result<Uuid, String> {
        Uuid::parse_str(&self.sub).map_err(|e| format!("Invalid UUID in sub claim: {e}"))
    }

    /// Best-effort display name from metadata.
    pub fn display_name(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.full_name.clone().or_else(|| m.name.clone()))
    }

    pub fn username(&self) -> Option<String> {
        self.user_metadata.as_ref().and_then(|m| m.user_name.clone())
    }

    /// Best-effort avatar URL from metadata.
    pub fn avatar_url(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.avatar_url.clone().or_else(|| m.picture.clone()))
    }

    /// Best-effort email: prefer top-level, fall back to metadata.
    pub fn user_email(&self) -> Option<String> {
        self.email
            .clone()
            .or_else(|| self.user_metadata.as_ref().and_then(|m| m.email.clone()))
    }

    pub fn app_role(&self) -> Roles {
        match self.role.as_deref() {
            Some("admin") => Roles::Admin,
            _ => Roles::User,
        }
    }
}

/// Validate an HS256-signed JWT and return the decoded claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Token validation failed: {e}"))
}
