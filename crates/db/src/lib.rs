//! Database Access Gateway for the tenant activity dashboard.
//!
//! - [`gateway`] -- scoped execution: acquire, run under a timeout, release.
//! - [`postgres`] -- relational provider (schema-per-tenant `search_path`).
//! - [`clickhouse`] -- analytical provider (database-per-tenant, HTTP).
//! - [`models`] -- row structs decoded by column name.
//! - [`repositories`] -- typed access used by the API layer.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod clickhouse;
pub mod error;
pub mod gateway;
pub mod models;
pub mod postgres;
pub mod repositories;
pub mod settings;

pub use error::QueryError;
pub use gateway::{ActivityGateway, ConnectionProvider, ScopedExecutor};
pub use settings::{ClickHouseSettings, PostgresSettings};

pub type DbPool = sqlx::PgPool;

/// How long a request waits for a free pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Create a connection pool for the relational store.
pub async fn create_pool(settings: &PostgresSettings) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(settings.connect_options())
        .await
}

/// Round-trip a trivial query to verify the pool can reach the database.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
