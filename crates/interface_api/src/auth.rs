//! Authentication and authorization
//!
//! Token issuance belongs to the identity provider; this module only
//! validates the bearer tokens it hands out and exposes the claims to
//! handlers. `create_token` exists for tests and local tooling.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User's roles
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `user_id` - User identifier
/// * `roles` - User's roles
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    user_id: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
///
/// # Arguments
///
/// * `token` - The JWT token to validate
/// * `secret` - JWT secret key
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        if e.to_string().contains("ExpiredSignature") {
            AuthError::TokenExpired
        } else {
            AuthError::InvalidToken
        }
    })?;

    Ok(token_data.claims)
}

/// Checks if user has required role
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims.roles.iter().any(|r| r == required_role || r == "admin")
}

/// Permission definitions
pub mod permissions {
    pub const ACCOUNT_READ: &str = "account:read";
    pub const ACCOUNT_WRITE: &str = "account:write";
    pub const ACCOUNT_ADMIN: &str = "account:admin";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let token = create_token("user-1", vec!["account:read".to_string()], "secret", 60)
            .expect("token should encode");
        let claims = validate_token(&token, "secret").expect("token should validate");

        assert_eq!(claims.sub, "user-1");
        assert!(has_role(&claims, "account:read"));
        assert!(!has_role(&claims, "account:admin"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token("user-1", vec![], "secret", 60).unwrap();
        assert!(matches!(
            validate_token(&token, "other-secret"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_admin_implies_all_roles() {
        let token = create_token("root", vec!["admin".to_string()], "secret", 60).unwrap();
        let claims = validate_token(&token, "secret").unwrap();
        assert!(has_role(&claims, "account:write"));
    }
}
