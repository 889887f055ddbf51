//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Store selection
//! - `ROLODEX_STORE` - `postgres` (default) or `memory`
//!
//! ## Postgres connection (when `ROLODEX_STORE=postgres`)
//! Either a full connection string:
//! - `ROLODEX_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! or its parts:
//! - `ROLODEX_DB_USER` - Database user (required)
//! - `ROLODEX_DB_PASSWORD` - Database password (required)
//! - `ROLODEX_DB_NAME` - Database name (required)
//! - `ROLODEX_DB_HOST` - Database host (default: localhost)
//! - `ROLODEX_DB_PORT` - Database port (default: 5432)
//!
//! ## Optional
//! - `ROLODEX_HOST` - Bind address (default: 127.0.0.1)
//! - `ROLODEX_PORT` - Listen port (default: 8080)
//! - `ROLODEX_LOG_FORMAT` - `text` (default) or `json`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server configuration, built once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Which user store backs the handlers
    pub store: StoreConfig,
    /// Emit JSON log lines instead of human-readable text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Backing store selection.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// `PostgreSQL` via a sqlx connection pool.
    Postgres(DatabaseConfig),
    /// Process-local store; contents are lost on restart.
    Memory,
}

/// How to reach the `PostgreSQL` database.
///
/// Implements `Debug` manually to redact credentials.
#[derive(Clone)]
pub enum DatabaseConfig {
    /// A full connection string (contains password).
    Url(SecretString),
    /// Individual connection parameters.
    Parts {
        host: String,
        port: u16,
        user: String,
        password: SecretString,
        name: String,
    },
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(_) => f.debug_tuple("Url").field(&"[REDACTED]").finish(),
            Self::Parts {
                host,
                port,
                user,
                name,
                ..
            } => f
                .debug_struct("Parts")
                .field("host", host)
                .field("port", port)
                .field("user", user)
                .field("password", &"[REDACTED]")
                .field("name", name)
                .finish(),
        }
    }
}

impl DatabaseConfig {
    /// Build sqlx connect options.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error::Configuration` if the connection string cannot be parsed.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        match self {
            Self::Url(url) => PgConnectOptions::from_str(url.expose_secret()),
            Self::Parts {
                host,
                port,
                user,
                password,
                name,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password.expose_secret())
                .database(name)),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(get);

        let host = env.parsed_or("ROLODEX_HOST", "127.0.0.1")?;
        let port = env.parsed_or("ROLODEX_PORT", "8080")?;

        let store = match env.or_default("ROLODEX_STORE", "postgres").as_str() {
            "postgres" => StoreConfig::Postgres(DatabaseConfig::from_env(&env)?),
            "memory" => StoreConfig::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "ROLODEX_STORE".to_string(),
                    format!("expected `postgres` or `memory`, got `{other}`"),
                ));
            }
        };

        let json_logs = match env.or_default("ROLODEX_LOG_FORMAT", "text").as_str() {
            "text" => false,
            "json" => true,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "ROLODEX_LOG_FORMAT".to_string(),
                    format!("expected `text` or `json`, got `{other}`"),
                ));
            }
        };

        Ok(Self {
            host,
            port,
            store,
            json_logs,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl DatabaseConfig {
    fn from_env<F>(env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // A full URL wins; DATABASE_URL is what most hosting platforms inject
        if let Some(url) = env
            .optional("ROLODEX_DATABASE_URL")
            .or_else(|| env.optional("DATABASE_URL"))
        {
            return Ok(Self::Url(SecretString::from(url)));
        }

        Ok(Self::Parts {
            host: env.or_default("ROLODEX_DB_HOST", "localhost"),
            port: env.parsed_or("ROLODEX_DB_PORT", "5432")?,
            user: env.required("ROLODEX_DB_USER")?,
            password: SecretString::from(env.required("ROLODEX_DB_PASSWORD")?),
            name: env.required("ROLODEX_DB_NAME")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Thin wrapper over a key lookup with the usual required/optional/default accessors.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a variable with a default value and parse it.
    fn parsed_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}
