/// Access log middleware
///
/// Wraps the whole router and appends one `access_logs` row per request:
/// method, original URI, status, latency, client IP and, for authenticated
/// requests, who made it.
///
/// The responder snapshot comes from the [`AuthContext`] that the JWT layer
/// copies into the response extensions; routes that never authenticate are
/// logged without one.
///
/// The insert runs on a spawned task after the response is ready. A failed
/// insert is logged with `tracing::warn!` and never changes the response.

use axum::{
    extract::{ConnectInfo, OriginalUri, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use gadgethub_shared::{
    auth::middleware::AuthContext,
    models::access_log::{AccessLog, NewAccessLog},
};
use std::net::SocketAddr;
use std::time::Instant;

use crate::app::AppState;

/// Records every request in the access log
pub async fn access_log_layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let started = Instant::now();

    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.to_string())
        .unwrap_or_else(|| req.uri().to_string());
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let ip = client_ip(req.headers(), peer);

    let response = next.run(req).await;

    let entry = build_entry(
        method,
        route,
        &response,
        ip,
        started.elapsed().as_millis() as i64,
    );

    let pool = state.db.clone();
    tokio::spawn(async move {
        if let Err(e) = AccessLog::create(&pool, entry).await {
            tracing::warn!(error = %e, "Failed to write access log entry");
        }
    });

    response
}

/// Client address, preferring the first `X-Forwarded-For` hop
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

fn build_entry(
    method: String,
    route: String,
    response: &Response,
    ip: Option<String>,
    response_time_ms: i64,
) -> NewAccessLog {
    let auth = response.extensions().get::<AuthContext>();

    NewAccessLog {
        method,
        route,
        status_code: i32::from(response.status().as_u16()),
        user_id: auth.map(|a| a.account_id),
        user_name: auth.map(|a| a.name.clone()),
        user_role: auth.map(|a| a.role.as_str().to_string()),
        ip,
        response_time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use axum::response::IntoResponse;
    use gadgethub_shared::auth::Role;
    use uuid::Uuid;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        let peer: SocketAddr = "10.0.0.1:4000".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(peer)).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_client_ip_falls_back_to_peer() {
        let peer: SocketAddr = "192.0.2.10:51000".parse().unwrap();

        assert_eq!(
            client_ip(&HeaderMap::new(), Some(peer)).as_deref(),
            Some("192.0.2.10")
        );
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }

    #[test]
    fn test_entry_without_auth() {
        let response = StatusCode::NOT_FOUND.into_response();
        let entry = build_entry(
            "GET".to_string(),
            "/api/products/meta?x=1".to_string(),
            &response,
            None,
            3,
        );

        assert_eq!(entry.status_code, 404);
        assert_eq!(entry.route, "/api/products/meta?x=1");
        assert!(entry.user_id.is_none());
        assert!(entry.user_name.is_none());
        assert!(entry.user_role.is_none());
    }

    #[test]
    fn test_entry_with_responder_snapshot() {
        let auth = AuthContext {
            account_id: Uuid::new_v4(),
            name: "Grace".to_string(),
            role: Role::Staff,
        };
        let mut response = StatusCode::OK.into_response();
        response.extensions_mut().insert(auth.clone());

        let entry = build_entry(
            "PUT".to_string(),
            "/api/orders/1".to_string(),
            &response,
            Some("127.0.0.1".to_string()),
            12,
        );

        assert_eq!(entry.user_id, Some(auth.account_id));
        assert_eq!(entry.user_name.as_deref(), Some("Grace"));
        assert_eq!(entry.user_role.as_deref(), Some("staff"));
        assert_eq!(entry.response_time_ms, 12);
    }
}
