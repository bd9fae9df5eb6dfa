//! Connection settings for the relational and analytical stores.
//!
//! These structs are plain data. They are built once at startup by the
//! application's configuration layer and handed to the providers; nothing in
//! this crate reads the process environment.

use std::fmt;

use sqlx::postgres::PgConnectOptions;

/// Default pool size for the relational store.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Default port of the ClickHouse HTTP interface.
pub const DEFAULT_CLICKHOUSE_HTTP_PORT: u16 = 8123;

/// PostgreSQL connection settings.
#[derive(Clone)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

impl PostgresSettings {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

impl fmt::Debug for PostgresSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// ClickHouse HTTP interface settings.
#[derive(Clone)]
pub struct ClickHouseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl ClickHouseSettings {
    /// Base URL of the HTTP interface, e.g. `http://clickhouse:8123/`.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}

impl fmt::Debug for ClickHouseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickHouseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}
