//! Scoped statement execution.
//!
//! Every statement runs inside an acquisition: a connection is acquired for
//! a scope, the statement runs under a bounded timeout, and the connection is
//! released afterwards whether the statement succeeded, failed or timed out.
//! The acquisition runs on its own task, so a caller that stops waiting
//! (request timeout, client disconnect) cannot skip the release.
//! [`ConnectionProvider`] is the seam between this protocol and a concrete
//! store; [`ScopedExecutor`] drives it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tenantwatch_core::query::Statement;
use tenantwatch_core::scope::TenantScope;
use tenantwatch_core::write_history::WriteHistoryRecord;

use crate::error::QueryError;

/// Upper bound on a single acquire, run or release step.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// A store that can hand out scoped connections.
pub trait ConnectionProvider: Send + Sync + 'static {
    /// The namespace a connection is bound to.
    type Scope: fmt::Display + Clone + Send + Sync + 'static;
    /// A connection bound to one scope.
    type Conn: Send + 'static;
    /// A raw result row.
    type Row: Send + 'static;

    /// Acquire a connection bound to `scope`.
    ///
    /// On error nothing has been acquired and nothing needs releasing.
    fn acquire(
        &self,
        scope: &Self::Scope,
    ) -> impl Future<Output = Result<Self::Conn, QueryError>> + Send;

    /// Execute a statement and fetch every row.
    fn run(
        &self,
        conn: &mut Self::Conn,
        statement: &Statement,
    ) -> impl Future<Output = Result<Vec<Self::Row>, QueryError>> + Send;

    /// Give a connection back. Must not fail; problems are logged.
    fn release(&self, conn: Self::Conn) -> impl Future<Output = ()> + Send;
}

/// Runs statements through a [`ConnectionProvider`] with guaranteed release.
pub struct ScopedExecutor<P> {
    provider: Arc<P>,
    timeout: Duration,
}

impl<P: ConnectionProvider> ScopedExecutor<P> {
    pub fn new(provider: P, timeout: Duration) -> Self {
        Self {
            provider: Arc::new(provider),
            timeout,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Acquire a connection for `scope`, run `statement`, release.
    ///
    /// Dropping the returned future does not cancel the acquisition: it runs
    /// to completion (bounded by the timeout) and releases its connection.
    pub async fn execute(
        &self,
        statement: &Statement,
        scope: &P::Scope,
    ) -> Result<Vec<P::Row>, QueryError> {
        let provider = Arc::clone(&self.provider);
        let statement = statement.clone();
        let scope = scope.clone();
        let timeout = self.timeout;

        tokio::spawn(async move { run_scoped(&*provider, &statement, &scope, timeout).await })
            .await
            .map_err(|e| QueryError::Execution(format!("statement task failed: {e}")))?
    }
}

async fn run_scoped<P: ConnectionProvider>(
    provider: &P,
    statement: &Statement,
    scope: &P::Scope,
    timeout: Duration,
) -> Result<Vec<P::Row>, QueryError> {
    let started = Instant::now();

    let mut conn = match tokio::time::timeout(timeout, provider.acquire(scope)).await {
        Ok(conn) => conn?,
        Err(_) => return Err(timed_out(started)),
    };

    let result = match tokio::time::timeout(timeout, provider.run(&mut conn, statement)).await {
        Ok(rows) => rows,
        Err(_) => Err(timed_out(started)),
    };

    if tokio::time::timeout(timeout, provider.release(conn)).await.is_err() {
        tracing::warn!(
            %scope,
            timeout_ms = timeout.as_millis() as u64,
            "Connection release timed out, connection dropped"
        );
    }

    match &result {
        Ok(rows) => tracing::debug!(
            %scope,
            rows = rows.len(),
            params = ?statement.param_names(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Statement executed"
        ),
        Err(e) => tracing::warn!(
            %scope,
            kind = e.kind(),
            error = %e,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Statement failed"
        ),
    }

    result
}

fn timed_out(started: Instant) -> QueryError {
    QueryError::Timeout {
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

/// Source of write-history records for the activity pipeline.
///
/// Implemented by the PostgreSQL repository in production and by in-memory
/// fakes in tests.
pub trait ActivityGateway: Send + Sync {
    fn fetch_write_history(
        &self,
        statement: &Statement,
        scope: &TenantScope,
    ) -> impl Future<Output = Result<Vec<WriteHistoryRecord>, QueryError>> + Send;
}
