//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup by [`Settings::from_env`] and then
//! shared immutably. Parsing goes through [`Settings::from_lookup`], which
//! takes any `key -> value` function, so tests never touch the process
//! environment.

use std::time::Duration;

use tenantwatch_db::settings::{DEFAULT_CLICKHOUSE_HTTP_PORT, DEFAULT_MAX_CONNECTIONS};
use tenantwatch_db::{ClickHouseSettings, PostgresSettings};

/// Configuration could not be loaded.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {0} must be set")]
    Missing(&'static str),

    #[error("Environment variable {key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound for one gateway query in seconds (default: `10`).
    pub query_timeout_secs: u64,
}

impl ServerConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

/// Outbound mail settings. Present only when `SMTP_HOST` is set.
#[derive(Clone)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub default_from_address: Option<String>,
    pub default_subject: Option<String>,
    pub sender: Option<String>,
    pub sender_name: Option<String>,
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("default_from_address", &self.default_from_address)
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

/// All settings the service needs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub postgres: PostgresSettings,
    pub clickhouse: ClickHouseSettings,
    pub mail: Option<MailSettings>,
    /// Reported by `/health` (default: the crate version).
    pub application_version: String,
}

impl Settings {
    /// Load settings from the process environment (after `.env`, if any).
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `QUERY_TIMEOUT_SECS`   | `10`                    |
    /// | `POSTGRES_HOST`        | required                |
    /// | `DATABASE_PORT`        | `5432`                  |
    /// | `POSTGRES_USER`        | required                |
    /// | `POSTGRES_PASSWORD`    | required                |
    /// | `POSTGRES_DB`          | required                |
    /// | `DB_MAX_CONNECTIONS`   | `20`                    |
    /// | `CH_DB_HOST`           | required                |
    /// | `CH_DB_PORT`           | `8123`                  |
    /// | `CH_DB_USER`           | required                |
    /// | `CH_DB_PASSWORD`       | required                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let server = ServerConfig {
            host: env.or("HOST", "0.0.0.0"),
            port: env.parse_or("PORT", 3000)?,
            cors_origins: env
                .or("CORS_ORIGINS", "http://localhost:5173")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            request_timeout_secs: env.parse_or("REQUEST_TIMEOUT_SECS", 30)?,
            query_timeout_secs: env.parse_or("QUERY_TIMEOUT_SECS", 10)?,
        };

        let postgres = PostgresSettings {
            host: env.required("POSTGRES_HOST")?,
            port: env.parse_or("DATABASE_PORT", 5432)?,
            user: env.required("POSTGRES_USER")?,
            password: env.required("POSTGRES_PASSWORD")?,
            database: env.required("POSTGRES_DB")?,
            max_connections: env.parse_or("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
        };

        let clickhouse = ClickHouseSettings {
            host: env.required("CH_DB_HOST")?,
            port: env.parse_or("CH_DB_PORT", DEFAULT_CLICKHOUSE_HTTP_PORT)?,
            user: env.required("CH_DB_USER")?,
            password: env.required("CH_DB_PASSWORD")?,
        };

        let mail = match env.get("SMTP_HOST") {
            Some(host) => Some(MailSettings {
                host,
                port: env.parse_or("SMTP_PORT", 587)?,
                user: env.get("SMTP_USER"),
                password: env.get("SMTP_PASSWORD"),
                default_from_address: env.get("SMTP_DEFAULT_FROM_ADDRESS"),
                default_subject: env.get("SMTP_DEFAULT_SUBJECT"),
                sender: env.get("SENDER"),
                sender_name: env.get("SENDERNAME"),
            }),
            None => None,
        };

        Ok(Self {
            server,
            postgres,
            clickhouse,
            mail,
            application_version: env.or("APPLICATION_VERSION", env!("CARGO_PKG_VERSION")),
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-blank value of `key`.
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn parse_or<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            }),
        }
    }
}
