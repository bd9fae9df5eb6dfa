//! PostgreSQL connection provider.
//!
//! A connection is scoped by opening a transaction and setting
//! `search_path` transaction-locally, so the scope disappears when the
//! transaction ends and a pooled connection never carries one tenant's
//! schema into the next caller's query. Release rolls the read-only
//! transaction back, which returns the connection to the pool.

use sqlx::postgres::PgRow;
use sqlx::{Postgres, Transaction};
use tenantwatch_core::query::{ParamValue, Statement};
use tenantwatch_core::scope::TenantScope;

use crate::error::QueryError;
use crate::gateway::ConnectionProvider;
use crate::DbPool;

/// Hands out scoped connections from a [`DbPool`].
#[derive(Clone)]
pub struct PgProvider {
    pool: DbPool,
}

impl PgProvider {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl ConnectionProvider for PgProvider {
    type Scope = TenantScope;
    type Conn = Transaction<'static, Postgres>;
    type Row = PgRow;

    async fn acquire(&self, scope: &TenantScope) -> Result<Self::Conn, QueryError> {
        let mut tx = self.pool.begin().await?;
        // `true` makes the setting local to this transaction.
        sqlx::query("SELECT set_config('search_path', $1, true)")
            .bind(scope.search_path())
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    async fn run(
        &self,
        conn: &mut Self::Conn,
        statement: &Statement,
    ) -> Result<Vec<PgRow>, QueryError> {
        let mut query = sqlx::query(&statement.sql);
        for param in &statement.params {
            query = match &param.value {
                ParamValue::Text(v) => query.bind(v.clone()),
                ParamValue::Int(v) => query.bind(*v),
                ParamValue::Float(v) => query.bind(*v),
            };
        }
        Ok(query.fetch_all(&mut **conn).await?)
    }

    async fn release(&self, conn: Self::Conn) {
        if let Err(e) = conn.rollback().await {
            // The connection is closed instead of being returned to the pool.
            tracing::warn!(error = %e, "Failed to end scoped transaction");
        }
    }
}
