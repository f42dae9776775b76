//! Authentication collaborator.
//!
//! HS256 JWT issue/validation, the bearer-token gate in front of the
//! table operations, and the password rules enforced at signup.

use std::sync::Arc;
use std::sync::LazyLock;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Tokens live for 24 hours, matching the cookie lifetime of the
/// original UI.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Account id (customer or admin)
    pub id: i64,
    pub email: String,
    #[serde(rename = "userType")]
    pub user_type: String,
    pub exp: usize,
}

/// Issue a signed token for an authenticated account.
pub fn issue_token(
    secret: &str,
    id: i64,
    email: &str,
    user_type: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = JwtClaims {
        id,
        email: email.to_string(),
        user_type: user_type.to_string(),
        exp: (Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate a token and extract its claims.
pub fn validate_token(secret: &str, token: &str) -> Result<JwtClaims, jsonwebtoken::errors::Error> {
    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Pull the bearer token out of an Authorization header value.
pub fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Middleware gating every table operation behind a valid token.
///
/// Stashes the validated claims in request extensions for handlers that
/// want the caller's identity.
pub async fn require_auth(
    State(state): State<Arc<GatewayState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return ApiError::unauthorized("Authentication required").into_response();
    };

    match validate_token(&state.config.jwt_secret, token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!("token rejected: {e}");
            ApiError::unauthorized("Invalid token").into_response()
        }
    }
}

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Loose email shape check, the same one the signup form applies.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Check a password against the signup policy. Returns one message per
/// violated rule; empty means the password is acceptable.
pub fn validate_password(password: &str) -> Vec<String> {
    const MIN_LENGTH: usize = 8;
    const SPECIAL: &str = "!@#$%^&*";

    let mut errors = Vec::new();
    if password.len() < MIN_LENGTH {
        errors.push(format!(
            "Password must be at least {MIN_LENGTH} characters long"
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one number".to_string());
    }
    if !password.chars().any(|c| SPECIAL.contains(c)) {
        errors.push(format!(
            "Password must contain at least one special character ({SPECIAL})"
        ));
    }
    errors
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Verify a password against a stored hash. Malformed hashes count as a
/// failed verification, not an error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip_preserves_claims() {
        let secret = "test-secret-key-12345";
        let token = issue_token(secret, 42, "admin@quickbite.io", "admin").unwrap();

        let claims = validate_token(secret, &token).unwrap();
        assert_eq!(claims.id, 42);
        assert_eq!(claims.email, "admin@quickbite.io");
        assert_eq!(claims.user_type, "admin");
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let token = issue_token("secret-a", 1, "a@b.co", "customer").unwrap();
        assert!(validate_token("secret-b", &token).is_err());
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(validate_token("secret", "not-a-token").is_err());
    }

    #[test]
    fn password_policy_reports_each_violation() {
        let errors = validate_password("short");
        assert_eq!(errors.len(), 4);

        let errors = validate_password("longenough");
        assert_eq!(errors.len(), 3);

        assert!(validate_password("Str0ng!pass").is_empty());
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("ayush.anand@gmail.com"));
        assert!(!is_valid_email("not an email"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn password_hash_roundtrip() {
        // Low cost keeps the test quick; production uses DEFAULT_COST.
        let hash = bcrypt::hash("Str0ng!pass", 4).unwrap();
        assert!(verify_password("Str0ng!pass", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("Str0ng!pass", "not-a-hash"));
    }
}
