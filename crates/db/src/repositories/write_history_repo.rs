//! Repository for `core_master.clickhouse_write_history`.

use sqlx::FromRow;
use tenantwatch_core::query::Statement;
use tenantwatch_core::scope::TenantScope;
use tenantwatch_core::write_history::WriteHistoryRecord;

use crate::error::QueryError;
use crate::gateway::{ActivityGateway, ScopedExecutor};
use crate::models::write_history::WriteHistoryRow;
use crate::postgres::PgProvider;

/// Reads write-history pages through the scoped PostgreSQL executor.
pub struct WriteHistoryRepo {
    executor: ScopedExecutor<PgProvider>,
}

impl WriteHistoryRepo {
    pub fn new(executor: ScopedExecutor<PgProvider>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &ScopedExecutor<PgProvider> {
        &self.executor
    }
}

impl ActivityGateway for WriteHistoryRepo {
    async fn fetch_write_history(
        &self,
        statement: &Statement,
        scope: &TenantScope,
    ) -> Result<Vec<WriteHistoryRecord>, QueryError> {
        let rows = self.executor.execute(statement, scope).await?;
        rows.iter()
            .map(|row| {
                WriteHistoryRow::from_row(row)
                    .map(WriteHistoryRecord::from)
                    .map_err(QueryError::from)
            })
            .collect()
    }
}
