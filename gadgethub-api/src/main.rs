//! # SmartGadgets Hub API Server
//!
//! REST backend for the SmartGadgets Hub store: catalog, checkout, order
//! handling, customer and staff accounts, dashboards and access logs.
//!
//! ## Start-up
//!
//! 1. Load configuration from the environment (and `.env`)
//! 2. Connect to PostgreSQL and apply migrations
//! 3. Create the default admin if no admin exists
//! 4. Serve until Ctrl+C, then drain the pool
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/gadgethub \
//! JWT_SECRET=change-me-to-something-at-least-32-chars \
//! cargo run -p gadgethub-api
//! ```

use std::net::SocketAddr;

use anyhow::Context;
use gadgethub_api::{
    app::{build_router, AppState},
    config::Config,
};
use gadgethub_shared::db::{
    bootstrap::ensure_default_admin,
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gadgethub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "SmartGadgets Hub API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    ensure_default_admin(&pool, &config.admin.email, &config.admin.password)
        .await
        .context("Failed to bootstrap admin account")?;

    let addr = config.bind_address();
    let state = AppState::new(pool.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    tracing::info!("Shutdown signal received, closing database pool...");
    close_pool(pool).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
