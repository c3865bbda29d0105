use std::time::Duration;

use spookify_core::activation::DEFAULT_ACTIVATION_TTL_HOURS;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Deadline for one track listing query in seconds (default: `5`).
    pub listing_timeout_secs: u64,
    /// Lifetime of activation tokens in hours (default: `72`).
    pub activation_token_ttl_hours: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `8000`                  |
    /// | `CORS_ORIGINS`               | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                    |
    /// | `LISTING_TIMEOUT_SECS`       | `5`                     |
    /// | `ACTIVATION_TOKEN_TTL_HOURS` | `72`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let listing_timeout_secs: u64 = std::env::var("LISTING_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("LISTING_TIMEOUT_SECS must be a valid u64");

        let activation_token_ttl_hours: i64 = std::env::var("ACTIVATION_TOKEN_TTL_HOURS")
            .map(|v| v.parse().expect("ACTIVATION_TOKEN_TTL_HOURS must be a valid i64"))
            .unwrap_or(DEFAULT_ACTIVATION_TTL_HOURS);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            listing_timeout_secs,
            activation_token_ttl_hours,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
