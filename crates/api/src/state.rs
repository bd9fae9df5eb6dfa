use std::sync::Arc;

use tenantwatch_db::clickhouse::ClickHouseProvider;
use tenantwatch_db::postgres::PgProvider;
use tenantwatch_db::repositories::WriteHistoryRepo;
use tenantwatch_db::{DbPool, ScopedExecutor};

use crate::activity::ActivityService;
use crate::config::{ServerConfig, Settings};
use crate::sessions::ViewSessionStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Relational connection pool.
    pub pool: DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Version string reported by `/health`.
    pub application_version: Arc<str>,
    /// Write-history pipeline over the relational store.
    pub activity: Arc<ActivityService<WriteHistoryRepo>>,
    /// Scoped executor for the analytical store.
    pub analytical: Arc<ScopedExecutor<ClickHouseProvider>>,
    /// Open dashboard views.
    pub views: Arc<ViewSessionStore>,
}

impl AppState {
    /// Wire the gateway, pipeline and session store around `pool`.
    pub fn new(pool: DbPool, settings: &Settings) -> Self {
        let timeout = settings.server.query_timeout();

        let repo = WriteHistoryRepo::new(ScopedExecutor::new(
            PgProvider::new(pool.clone()),
            timeout,
        ));
        let analytical = ScopedExecutor::new(
            ClickHouseProvider::new(settings.clickhouse.clone()),
            timeout,
        );

        Self {
            pool,
            config: Arc::new(settings.server.clone()),
            application_version: Arc::from(settings.application_version.as_str()),
            activity: Arc::new(ActivityService::new(repo)),
            analytical: Arc::new(analytical),
            views: Arc::new(ViewSessionStore::new()),
        }
    }
}
