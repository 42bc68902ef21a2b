//! Authentication and authorization utilities
//!
//! This module provides the authentication primitives for SmartGadgets Hub:
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and validation
//! - [`jwt`]: JWT token generation and validation
//! - [`middleware`]: Bearer token extraction and the per-request [`middleware::AuthContext`]
//! - [`authorization`]: Role gate and ownership checks
//!
//! # Roles
//!
//! Every token carries exactly one [`Role`]. Customer accounts are always
//! `customer`; staff accounts are `admin` or `staff`.
//!
//! # Example
//!
//! ```no_run
//! use gadgethub_shared::auth::password::{hash_password, verify_password};
//! use gadgethub_shared::auth::jwt::{create_token, validate_token, Claims};
//! use gadgethub_shared::auth::Role;
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("my_password")?;
//! assert!(verify_password("my_password", &hash)?);
//!
//! let claims = Claims::new(Uuid::new_v4(), "Jane", Role::Customer);
//! let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
//! let validated = validate_token(&token, "secret-key-at-least-32-bytes-long!!")?;
//! assert_eq!(validated.role, Role::Customer);
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::staff::StaffRole;

/// Role carried in a token claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shopper account
    Customer,

    /// Store employee
    Staff,

    /// Store administrator
    Admin,
}

impl Role {
    /// Gets role as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    /// Whether the role belongs to a staff account (admin or staff)
    pub fn is_staff_account(&self) -> bool {
        matches!(self, Role::Staff | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<StaffRole> for Role {
    fn from(role: StaffRole) -> Self {
        match role {
            StaffRole::Admin => Role::Admin,
            StaffRole::Staff => Role::Staff,
        }
    }
}
