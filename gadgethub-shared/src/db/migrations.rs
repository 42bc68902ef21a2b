//! Database migration runner
//!
//! Migrations live in `migrations/` at the workspace root and are embedded
//! into the binary at compile time. They are up-only.
//!
//! # Example
//!
//! ```no_run
//! use gadgethub_shared::db::pool::{create_pool, DatabaseConfig};
//! use gadgethub_shared::db::migrations::run_migrations;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig {
//!     url: std::env::var("DATABASE_URL")?,
//!     ..Default::default()
//! })
//! .await?;
//!
//! run_migrations(&pool).await?;
//! # Ok(())
//! # }
//! ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if a migration fails to apply or an already-applied
/// migration was edited after the fact
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("../migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Number of migrations embedded in this build
pub fn embedded_migration_count() -> usize {
    sqlx::migrate!("../migrations").iter().count()
}

/// Creates the database if it doesn't exist
///
/// Used by the integration test harness; production databases are
/// provisioned separately.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    } else {
        debug!("Database already exists");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_migrations_are_embedded() {
        // accounts, products, orders, access logs
        assert_eq!(embedded_migration_count(), 4);
    }
}
