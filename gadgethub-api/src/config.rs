/// Configuration management for the API server
///
/// This module loads configuration from environment variables (and a `.env`
/// file when present) into a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 5000)
/// - `API_PRODUCTION`: Enables HSTS and other production-only headers (default: false)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: http://localhost:5173)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 characters)
/// - `JWT_EXPIRATION_DAYS`: Token lifetime in days (default: 30)
/// - `ADMIN_EMAIL` / `ADMIN_PASSWORD`: Default admin created on first start-up
/// - `RUST_LOG`: Log filter (default: gadgethub_api=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use gadgethub_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use gadgethub_shared::auth::jwt::DEFAULT_EXPIRATION_DAYS;
use gadgethub_shared::db::bootstrap::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};
use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Default admin account
    pub admin: AdminConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Production mode (adds HSTS)
    pub production: bool,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Token lifetime in days
    pub expiration_days: i64,
}

/// Credentials for the start-up admin bootstrap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - A numeric or boolean variable can't be parsed
    /// - `JWT_SECRET` is shorter than 32 characters
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = var_or("API_HOST", "0.0.0.0");
        let api_port = var_or("API_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is not a valid port: {}", e))?;
        let production = var_or("API_PRODUCTION", "false")
            .parse::<bool>()
            .map_err(|e| anyhow::anyhow!("API_PRODUCTION must be true or false: {}", e))?;
        let cors_origins = parse_origins(&var_or("CORS_ORIGINS", DEFAULT_CORS_ORIGIN));

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = var_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let expiration_days = var_or("JWT_EXPIRATION_DAYS", &DEFAULT_EXPIRATION_DAYS.to_string())
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("JWT_EXPIRATION_DAYS is invalid: {}", e))?;

        if expiration_days < 1 {
            anyhow::bail!("JWT_EXPIRATION_DAYS must be at least 1");
        }

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                production,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expiration_days,
            },
            admin: AdminConfig {
                email: var_or("ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
                password: var_or("ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert!(!config.api.production);
        assert_eq!(config.api.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.expiration_days, 30);
        assert_eq!(config.admin.email, "admin@smartgadgets.com");
        assert_eq!(config.admin.password, "Admin@123");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "8080"),
            ("API_PRODUCTION", "true"),
            ("CORS_ORIGINS", "https://shop.example.com, https://admin.example.com,"),
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("JWT_EXPIRATION_DAYS", "7"),
            ("ADMIN_EMAIL", "root@example.com"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert!(config.api.production);
        assert_eq!(
            config.api.cors_origins,
            vec!["https://shop.example.com", "https://admin.example.com"]
        );
        assert_eq!(config.jwt.expiration_days, 7);
        assert_eq!(config.admin.email, "root@example.com");
    }

    #[test]
    fn test_missing_required_variables() {
        let err = load(&[("JWT_SECRET", SECRET)]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = load(&[("DATABASE_URL", "postgresql://localhost/test")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", "too-short"),
        ])
        .unwrap_err();

        assert!(err.to_string().contains("at least 32 characters"));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("API_PORT", "http"),
        ]);

        assert!(result.is_err());
    }
}
