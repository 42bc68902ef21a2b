//! Start-up bootstrap
//!
//! A fresh database has no staff accounts, and staff registration is admin
//! only. [`ensure_default_admin`] breaks that cycle by creating one admin
//! account when none exists.

use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::password::{hash_password, PasswordError};
use crate::models::staff::Staff;

/// Display name of the bootstrap admin
pub const DEFAULT_ADMIN_NAME: &str = "System Administrator";

/// Default admin email when `ADMIN_EMAIL` is unset
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@smartgadgets.com";

/// Default admin password when `ADMIN_PASSWORD` is unset
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin@123";

/// Error type for the bootstrap step
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Failed to hash admin password: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of [`ensure_default_admin`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminBootstrap {
    /// A new admin account was inserted
    Created { email: String },

    /// An admin already existed, or the email was taken; nothing changed
    Skipped,
}

/// Creates the default admin if no admin account exists
///
/// Idempotent: the existence check and insert are one statement, so running
/// it on every start-up (or from several instances at once) never produces a
/// second admin.
pub async fn ensure_default_admin(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<AdminBootstrap, BootstrapError> {
    let password_hash = hash_password(password)?;

    match Staff::create_admin_if_none(pool, DEFAULT_ADMIN_NAME, email, &password_hash).await? {
        Some(admin) => {
            info!(email = %admin.email, "Default admin account created");
            Ok(AdminBootstrap::Created { email: admin.email })
        }
        None => {
            if Staff::count_admins(pool).await? == 0 {
                warn!(email = %email, "No admin exists but the default admin email is taken");
            } else {
                info!("Admin account already present, skipping bootstrap");
            }
            Ok(AdminBootstrap::Skipped)
        }
    }
}
