//! Role gate and ownership checks
//!
//! Every protected endpoint names the set of roles it accepts. The check is
//! an exact match against the caller's role claim: `admin` is not implicitly
//! allowed where only `staff` is listed.
//!
//! # Example
//!
//! ```
//! use gadgethub_shared::auth::authorization::{require_role, ADMIN_OR_STAFF};
//! use gadgethub_shared::auth::middleware::AuthContext;
//! use gadgethub_shared::auth::Role;
//! use uuid::Uuid;
//!
//! let auth = AuthContext {
//!     account_id: Uuid::new_v4(),
//!     name: "Grace".to_string(),
//!     role: Role::Staff,
//! };
//!
//! assert!(require_role(&auth, ADMIN_OR_STAFF).is_ok());
//! assert!(require_role(&auth, &[Role::Admin]).is_err());
//! ```

use uuid::Uuid;

use super::middleware::AuthContext;
use super::Role;

/// Admin only
pub const ADMIN: &[Role] = &[Role::Admin];

/// Any staff account
pub const ADMIN_OR_STAFF: &[Role] = &[Role::Admin, Role::Staff];

/// Customer accounts only
pub const CUSTOMER: &[Role] = &[Role::Customer];

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller's role is not in the allowed set
    #[error("Access denied: role '{actual}' is not one of [{}]", format_roles(allowed))]
    RoleNotAllowed {
        allowed: Vec<Role>,
        actual: Role,
    },

    /// Caller is not the account being acted on
    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

fn format_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Checks the caller's role against an allowed set
///
/// # Errors
///
/// Returns `AuthzError::RoleNotAllowed` when the role is not listed
pub fn require_role(auth: &AuthContext, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.contains(&auth.role) {
        return Ok(());
    }

    Err(AuthzError::RoleNotAllowed {
        allowed: allowed.to_vec(),
        actual: auth.role,
    })
}

/// Checks that the caller is the given account
pub fn require_self(auth: &AuthContext, account_id: Uuid) -> Result<(), AuthzError> {
    if !auth.is_account(account_id) {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}

/// Allows the account itself, or any caller whose role is in `allowed`
pub fn require_self_or_role(
    auth: &AuthContext,
    account_id: Uuid,
    allowed: &[Role],
) -> Result<(), AuthzError> {
    if auth.is_account(account_id) || allowed.contains(&auth.role) {
        return Ok(());
    }

    Err(AuthzError::NotAuthorized)
}
