//! Bearer token authentication for Axum
//!
//! Credentials are read from the `Authorization: Bearer <token>` header,
//! validated, and turned into an [`AuthContext`] that the API server inserts
//! into request extensions.
//!
//! # Example
//!
//! ```
//! use axum::Extension;
//! use gadgethub_shared::auth::middleware::AuthContext;
//!
//! async fn handler(Extension(auth): Extension<AuthContext>) -> String {
//!     format!("{} ({})", auth.name, auth.role)
//! }
//! ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, Claims, JwtError};
use super::Role;

/// Authentication context for one request
///
/// Snapshot of the token claims; nothing here is re-read from the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Customer or staff account ID
    pub account_id: Uuid,

    /// Display name at login time
    pub name: String,

    /// Role claim
    pub role: Role,
}

impl AuthContext {
    /// Whether the caller is the given account
    pub fn is_account(&self, id: Uuid) -> bool {
        self.account_id == id
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            account_id: claims.sub,
            name: claims.name,
            role: claims.role,
        }
    }
}

/// Error type for bearer authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Not authorized, no token")]
    MissingCredentials,

    /// Authorization header is not a bearer token
    #[error("{0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),
}

/// Authenticates a request from its headers
///
/// # Errors
///
/// - `MissingCredentials` when there is no `Authorization` header
/// - `InvalidFormat` when it is not `Bearer <token>`
/// - `InvalidToken` when the signature, issuer or expiry check fails
pub fn authenticate_bearer(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken("Not authorized, token failed".to_string()),
    })?;

    Ok(AuthContext::from(claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::create_token;
    use axum::http::HeaderValue;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_auth_context_from_claims() {
        let id = Uuid::new_v4();
        let context = AuthContext::from(Claims::new(id, "Ada", Role::Admin));

        assert_eq!(context.account_id, id);
        assert_eq!(context.name, "Ada");
        assert_eq!(context.role, Role::Admin);
        assert!(context.is_account(id));
        assert!(!context.is_account(Uuid::new_v4()));
    }

    #[test]
    fn test_authenticate_valid_token() {
        let id = Uuid::new_v4();
        let token = create_token(&Claims::new(id, "Bob", Role::Customer), SECRET).unwrap();

        let context = authenticate_bearer(&bearer(&token), SECRET).unwrap();
        assert_eq!(context.account_id, id);
        assert_eq!(context.role, Role::Customer);
    }

    #[test]
    fn test_authenticate_missing_header() {
        let result = authenticate_bearer(&HeaderMap::new(), SECRET);
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn test_authenticate_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));

        let result = authenticate_bearer(&headers, SECRET);
        assert!(matches!(result, Err(AuthError::InvalidFormat(_))));
    }

    #[test]
    fn test_authenticate_expired_token() {
        let claims = Claims::with_expiration(
            Uuid::new_v4(),
            "Bob",
            Role::Customer,
            Duration::seconds(-3600),
        );
        let token = create_token(&claims, SECRET).unwrap();

        match authenticate_bearer(&bearer(&token), SECRET) {
            Err(AuthError::InvalidToken(msg)) => assert_eq!(msg, "Token expired"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_authenticate_tampered_token() {
        let result = authenticate_bearer(&bearer("abc.def.ghi"), SECRET);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }
}
