/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use gadgethub_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = gadgethub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::{request_log::access_log_layer, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use gadgethub_shared::auth::middleware::authenticate_bearer;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Lifetime of issued tokens
    pub fn token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::days(self.config.jwt.expiration_days)
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /health                                    public
/// /api/auth/{customer,staff}/login           public
/// /api/auth/{customer,staff}/profile         token
/// /api/customers          POST public, rest token
/// /api/staff              token
/// /api/products           GET public, writes token
/// /api/orders             token
/// /api/users              token
/// /api/stats              token
/// /api/logs               token
/// ```
///
/// Role checks happen inside the handlers; the JWT layer only establishes
/// who the caller is.
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. Access log
/// 2. Security headers
/// 3. CORS
/// 4. Tracing (tower-http TraceLayer)
/// 5. JWT authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    let auth = || from_fn_with_state(state.clone(), jwt_auth_layer);

    let customer_routes = Router::new()
        .route("/", post(routes::customers::register))
        .merge(
            Router::new()
                .route("/", get(routes::customers::list))
                .route(
                    "/:id",
                    get(routes::customers::get)
                        .put(routes::customers::update)
                        .delete(routes::customers::delete),
                )
                .route_layer(auth()),
        );

    let staff_routes = Router::new()
        .route(
            "/",
            post(routes::staff::register).get(routes::staff::list),
        )
        .route(
            "/:id",
            get(routes::staff::get)
                .put(routes::staff::update)
                .delete(routes::staff::delete),
        )
        .route_layer(auth());

    let customer_auth_routes = Router::new()
        .route("/login", post(routes::auth::customer_login))
        .merge(
            Router::new()
                .route("/profile", get(routes::auth::customer_profile))
                .route_layer(auth()),
        );

    let staff_auth_routes = Router::new()
        .route("/login", post(routes::auth::staff_login))
        .merge(
            Router::new()
                .route("/profile", get(routes::auth::staff_profile))
                .route_layer(auth()),
        );

    let product_routes = Router::new()
        .route("/", get(routes::products::list))
        .route("/meta", get(routes::products::meta))
        .route("/:id", get(routes::products::get))
        .route("/category/:category", get(routes::products::by_category))
        .route("/brand/:brand", get(routes::products::by_brand))
        .merge(
            Router::new()
                .route("/", post(routes::products::create))
                .route(
                    "/:id",
                    put(routes::products::update).delete(routes::products::delete),
                )
                .route_layer(auth()),
        );

    let order_routes = Router::new()
        .route(
            "/",
            post(routes::orders::create).get(routes::orders::list),
        )
        .route("/my-orders", get(routes::orders::my_orders))
        .route(
            "/:id",
            put(routes::orders::update_status).delete(routes::orders::delete),
        )
        .route_layer(auth());

    let user_routes = Router::new()
        .route("/reset-password/:id", put(routes::users::reset_password))
        .route(
            "/admin/reset-password/:id",
            put(routes::users::admin_reset_password),
        )
        .route_layer(auth());

    let stats_routes = Router::new()
        .route("/admin-dashboard", get(routes::stats::admin_dashboard))
        .route("/staff-dashboard", get(routes::stats::staff_dashboard))
        .route_layer(auth());

    let log_routes = Router::new()
        .route("/", get(routes::logs::list))
        .route_layer(auth());

    let api_routes = Router::new()
        .nest("/auth/customer", customer_auth_routes)
        .nest("/auth/staff", staff_auth_routes)
        .nest("/customers", customer_routes)
        .nest("/staff", staff_routes)
        .nest("/products", product_routes)
        .nest("/orders", order_routes)
        .nest("/users", user_routes)
        .nest("/stats", stats_routes)
        .nest("/logs", log_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .fallback(routes::not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .layer(from_fn_with_state(state.clone(), access_log_layer))
        .with_state(state)
}

/// CORS from the configured origin list; `*` is permissive
fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// JWT authentication middleware layer
///
/// Validates the bearer token and injects [`AuthContext`] into the request
/// extensions. The context is also copied onto the response so the access
/// log can record who made the request.
///
/// [`AuthContext`]: gadgethub_shared::auth::middleware::AuthContext
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate_bearer(req.headers(), state.jwt_secret())?;

    req.extensions_mut().insert(auth.clone());

    let mut response = next.run(req).await;
    response.extensions_mut().insert(auth);

    Ok(response)
}
