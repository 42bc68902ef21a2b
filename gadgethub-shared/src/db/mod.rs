//! Database layer for SmartGadgets Hub
//!
//! # Modules
//!
//! - `pool`: PostgreSQL connection pool management with health checks
//! - `migrations`: Embedded migration runner
//! - `bootstrap`: Start-up data the service cannot run without
//!
//! Models are in the [`crate::models`] module.
//!
//! # Example
//!
//! ```no_run
//! use gadgethub_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig {
//!         url: std::env::var("DATABASE_URL")?,
//!         ..Default::default()
//!     };
//!
//!     let pool = create_pool(config).await?;
//!     gadgethub_shared::db::migrations::run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

pub mod bootstrap;
pub mod migrations;
pub mod pool;
