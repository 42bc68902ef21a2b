/// Middleware modules for the API server
///
/// - `security`: security response headers
/// - `request_log`: per-request access log

pub mod request_log;
pub mod security;
