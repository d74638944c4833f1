//! JWT validation tests.
//!
//! Tokens are minted locally with the same HS256 secret the server would use,
//! then validated through `validate_token`. No server or database is needed.
//!
//! Run with: `cargo test --test auth_test`
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use photo_contest_backend::auth::jwt::{Claims, UserMetadata, validate_token};
use photo_contest_backend::models::users::Roles;

/// A fake secret for testing. Never use the real one in tests committed to git.
const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

fn sign(claims: &Claims, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}

/// Helper: mint a JWT signed with HS256 using the test secret.
fn mint_test_token(sub: &str, email: &str, full_name: &str) -> String {
    let now = Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: sub.to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: Some("https://auth.example.com".to_string()),
        email: Some(email.to_string()),
        role: None,
        user_metadata: Some(UserMetadata {
            full_name: Some(full_name.to_string()),
            name: None,
            user_name: Some("alice_shoots".to_string()),
            avatar_url: Some("https://example.com/avatar.png".to_string()),
            picture: None,
            email: Some(email.to_string()),
            email_verified: Some(true),
        }),
    };

    sign(&claims, TEST_SECRET)
}

#[test]
fn test_valid_token_decodes_correctly() {
    let user_id = Uuid::new_v4();
    let token = mint_test_token(&user_id.to_string(), "alice@example.com", "Alice Smith");

    let claims = validate_token(&token, TEST_SECRET).expect("Token should be valid");

    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.user_email().unwrap(), "alice@example.com");
    assert_eq!(claims.display_name().unwrap(), "Alice Smith");
    assert_eq!(claims.username().unwrap(), "alice_shoots");
    assert_eq!(
        claims.avatar_url().unwrap(),
        "https://example.com/avatar.png"
    );
    assert_eq!(claims.user_id().unwrap(), user_id);
    assert_eq!(claims.app_role(), Roles::User);
}

#[test]
fn test_expired_token_is_rejected() {
    let now = Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        exp: now - 300, // well past the 60s default leeway
        iat: Some(now - 3600),
        iss: None,
        email: Some("expired@example.com".to_string()),
        role: None,
        user_metadata: None,
    };

    let result = validate_token(&sign(&claims, TEST_SECRET), TEST_SECRET);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("ExpiredSignature"));
}

#[test]
fn test_wrong_secret_is_rejected() {
    let token = mint_test_token(&Uuid::new_v4().to_string(), "bob@example.com", "Bob Jones");

    let result = validate_token(&token, "completely-wrong-secret-xxxxxxxxxxxxxxxxxxx");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("InvalidSignature"));
}

#[test]
fn test_garbage_token_is_rejected() {
    let result = validate_token("not.a.valid.jwt", TEST_SECRET);
    assert!(result.is_err());
}

#[test]
fn test_admin_role_claim() {
    let now = Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: None,
        email: Some("judge@example.com".to_string()),
        role: Some("admin".to_string()),
        user_metadata: None,
    };

    let decoded = validate_token(&sign(&claims, TEST_SECRET), TEST_SECRET).unwrap();
    assert_eq!(decoded.app_role(), Roles::Admin);
}

#[test]
fn test_claims_helpers_with_missing_metadata() {
    let now = Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: "not-a-uuid".to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: None,
        email: Some("bare@example.com".to_string()),
        role: None,
        user_metadata: None,
    };

    // Should fall back to top-level email.
    assert_eq!(claims.user_email().unwrap(), "bare@example.com");
    assert!(claims.display_name().is_none());
    assert!(claims.avatar_url().is_none());
    assert!(claims.username().is_none());
    assert!(claims.user_id().is_err());
}
