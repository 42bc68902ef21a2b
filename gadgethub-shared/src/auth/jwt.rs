//! JWT token generation and validation module
//!
//! Tokens are signed using HS256 (HMAC-SHA256) and identify one account
//! together with its role and display name.
//!
//! # Security
//!
//! - **Algorithm**: HS256 (HMAC with SHA-256)
//! - **Expiration**: Configurable (default 30 days)
//! - **Validation**: Signature, expiration, not-before and issuer checks
//! - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
//!
//! The role is read from the token on every request and is never re-checked
//! against the database, so a role change only takes effect once the holder
//! logs in again.
//!
//! # Example
//!
//! ```
//! use gadgethub_shared::auth::jwt::{create_token, validate_token, Claims};
//! use gadgethub_shared::auth::Role;
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let account_id = Uuid::new_v4();
//!
//! let claims = Claims::new(account_id, "Jane Doe", Role::Staff);
//! let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
//!
//! let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
//! assert_eq!(validated.sub, account_id);
//! assert_eq!(validated.role, Role::Staff);
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// Issuer written into and required from every token
pub const ISSUER: &str = "gadgethub";

/// Default token lifetime in days
pub const DEFAULT_EXPIRATION_DAYS: i64 = 30;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (customer or staff account ID)
/// - `iss`: Issuer (always "gadgethub")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `name`: Display name at login time, used for access log snapshots
/// - `role`: `customer`, `staff` or `admin`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - Account ID
    pub sub: Uuid,

    /// Display name (custom claim)
    pub name: String,

    /// Account role (custom claim)
    pub role: Role,

    /// Issuer - Always "gadgethub"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates new claims with the default 30 day expiration
    ///
    /// # Example
    ///
    /// ```
    /// use gadgethub_shared::auth::jwt::Claims;
    /// use gadgethub_shared::auth::Role;
    /// use uuid::Uuid;
    ///
    /// let claims = Claims::new(Uuid::new_v4(), "Jane", Role::Customer);
    /// assert!(!claims.is_expired());
    /// ```
    pub fn new(account_id: Uuid, name: impl Into<String>, role: Role) -> Self {
        Self::with_expiration(
            account_id,
            name,
            role,
            Duration::days(DEFAULT_EXPIRATION_DAYS),
        )
    }

    /// Creates claims with custom expiration
    pub fn with_expiration(
        account_id: Uuid,
        name: impl Into<String>,
        role: Role,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: account_id,
            name: name.into(),
            role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Creates a JWT token from claims
///
/// Signs the token using HS256 (HMAC-SHA256) with the provided secret.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token creation fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies:
/// - Signature is valid
/// - Token hasn't expired
/// - Issuer is "gadgethub"
/// - Token is not used before nbf time
///
/// # Errors
///
/// Returns error if the signature, expiry, issuer or format is invalid
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let account_id = Uuid::new_v4();

        let claims = Claims::new(account_id, "Ada", Role::Admin);

        assert_eq!(claims.sub, account_id);
        assert_eq!(claims.name, "Ada");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, "gadgethub");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_default_expiration_is_thirty_days() {
        let claims = Claims::new(Uuid::new_v4(), "Ada", Role::Customer);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_claims_with_custom_expiration() {
        let claims = Claims::with_expiration(
            Uuid::new_v4(),
            "Ada",
            Role::Customer,
            Duration::hours(1),
        );

        let time_left = claims.time_until_expiration().unwrap();
        assert!(time_left.num_seconds() > 3500);
        assert!(time_left.num_seconds() <= 3600);
    }

    #[test]
    fn test_create_and_validate_token() {
        let account_id = Uuid::new_v4();

        let claims = Claims::new(account_id, "Grace", Role::Staff);
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, account_id);
        assert_eq!(validated.name, "Grace");
        assert_eq!(validated.role, Role::Staff);
        assert_eq!(validated.iss, "gadgethub");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(Uuid::new_v4(), "Grace", Role::Staff);
        let token = create_token(&claims, SECRET).expect("Should create token");

        let result = validate_token(&token, "another-secret-key-at-least-32-bytes");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        // Expired an hour ago, well past the decoder's leeway
        let claims = Claims::with_expiration(
            Uuid::new_v4(),
            "Grace",
            Role::Customer,
            Duration::seconds(-3600),
        );

        assert!(claims.is_expired());
        assert!(claims.time_until_expiration().is_none());

        let token = create_token(&claims, SECRET).expect("Should create token");
        let result = validate_token(&token, SECRET);

        assert!(matches!(result.unwrap_err(), JwtError::Expired));
    }

    #[test]
    fn test_validate_wrong_issuer() {
        let mut claims = Claims::new(Uuid::new_v4(), "Grace", Role::Customer);
        claims.iss = "someone-else".to_string();

        let token = create_token(&claims, SECRET).unwrap();
        let result = validate_token(&token, SECRET);

        assert!(matches!(result.unwrap_err(), JwtError::InvalidIssuer { .. }));
    }

    #[test]
    fn test_validate_garbage_token() {
        let result = validate_token("not.a.token", SECRET);
        assert!(matches!(result.unwrap_err(), JwtError::ValidationError(_)));
    }
}
