//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `HTTP_HOST` - Bind address (default: 0.0.0.0)
//! - `HTTP_PORT` - Listen port (default: 8080)
//! - `HTTP_TIMEOUT_SECS` - Per-request timeout (default: 4)
//! - `STORAGE_BACKEND` - `memory` or `postgres` (default: memory)
//! - `DATABASE_URL` - `PostgreSQL` connection string (required for `postgres`)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `JWT_SECRET` - HS256 signing secret (default: insecure dev secret)
//! - `JWT_TTL_SECS` - Token lifetime (default: 86400)
//! - `LOG_FORMAT` - `json` or `pretty` (default: json)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use pvz_infra::{StorageBackend, StorageConfig};
use pvz_observability::LogFormat;

const DEV_JWT_SECRET: &str = "pvz-dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub request_timeout: Duration,
    pub storage: StorageConfig,
    pub jwt_secret: SecretString,
    pub jwt_ttl: chrono::Duration,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Calls `dotenvy::dotenv()` first so a local `.env` file is honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let host = parse("HTTP_HOST", &get_or("HTTP_HOST", "0.0.0.0"))?;
        let port = parse("HTTP_PORT", &get_or("HTTP_PORT", "8080"))?;
        let timeout_secs: u64 = parse("HTTP_TIMEOUT_SECS", &get_or("HTTP_TIMEOUT_SECS", "4"))?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "HTTP_TIMEOUT_SECS".to_string(),
                "must be positive".to_string(),
            ));
        }

        let backend: StorageBackend = get_or("STORAGE_BACKEND", "memory")
            .parse()
            .map_err(|e| ConfigError::InvalidEnvVar("STORAGE_BACKEND".to_string(), e))?;
        let database_url = get("DATABASE_URL").map(SecretString::from);
        if backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
        }
        let max_connections = parse(
            "DB_MAX_CONNECTIONS",
            &get_or(
                "DB_MAX_CONNECTIONS",
                &StorageConfig::DEFAULT_MAX_CONNECTIONS.to_string(),
            ),
        )?;

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string());
        let jwt_ttl_secs: i64 = parse("JWT_TTL_SECS", &get_or("JWT_TTL_SECS", "86400"))?;
        if jwt_ttl_secs <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "JWT_TTL_SECS".to_string(),
                "must be positive".to_string(),
            ));
        }

        let log_format: LogFormat = get_or("LOG_FORMAT", "json")
            .parse()
            .map_err(|e| ConfigError::InvalidEnvVar("LOG_FORMAT".to_string(), e))?;

        Ok(Self {
            host,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            storage: StorageConfig {
                backend,
                database_url,
                max_connections,
            },
            jwt_secret: SecretString::from(jwt_secret),
            jwt_ttl: chrono::Duration::seconds(jwt_ttl_secs),
            log_format,
        })
    }

    /// In-memory storage and a fixed secret; for tests and local runs.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            request_timeout: Duration::from_secs(4),
            storage: StorageConfig::in_memory(),
            jwt_secret: SecretString::from(jwt_secret.to_string()),
            jwt_ttl: chrono::Duration::hours(24),
            log_format: LogFormat::Pretty,
        }
    }

    /// True when `JWT_SECRET` was absent and the built-in dev secret is in use.
    ///
    /// Loading runs before tracing is installed, so the caller reports this.
    pub fn uses_dev_jwt_secret(&self) -> bool {
        self.jwt_secret.expose_secret() == DEV_JWT_SECRET
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
