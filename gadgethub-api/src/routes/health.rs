/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```
///
/// Always 200 so load balancers can tell a running process from a dead one;
/// `status` is `degraded` when PostgreSQL is unreachable.

use crate::app::AppState;
use axum::{extract::State, Json};
use gadgethub_shared::{db::pool, VERSION};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    /// Application version
    pub version: String,

    /// `connected` or `disconnected`
    pub database: String,
}

impl HealthResponse {
    fn from_database(connected: bool) -> Self {
        let (status, database) = if connected {
            ("healthy", "connected")
        } else {
            ("degraded", "disconnected")
        };

        Self {
            status: status.to_string(),
            version: VERSION.to_string(),
            database: database.to_string(),
        }
    }
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match pool::health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Json(HealthResponse::from_database(connected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_states() {
        let healthy = HealthResponse::from_database(true);
        assert_eq!(healthy.status, "healthy");
        assert_eq!(healthy.database, "connected");
        assert_eq!(healthy.version, VERSION);

        let degraded = HealthResponse::from_database(false);
        assert_eq!(degraded.status, "degraded");
        assert_eq!(degraded.database, "disconnected");
    }
}
