//! The activity pipeline: execute a planned query, normalize the rows and
//! render a panel.
//!
//! Gateway and normalizer failures stop here. They become the panel's
//! `error` message next to an empty table, so callers always get something
//! displayable.

use serde::Serialize;
use tenantwatch_core::error::CoreError;
use tenantwatch_core::normalize::{normalize, NormalizedPage, NO_DATA_MESSAGE};
use tenantwatch_core::pagination::PageState;
use tenantwatch_core::query::{ActivityFilter, QueryShape};
use tenantwatch_core::scope::TenantId;
use tenantwatch_core::view::{Panel, PlannedQuery};
use tenantwatch_core::write_history::DisplayRecord;
use tenantwatch_db::{ActivityGateway, QueryError};

/// Anything that can go wrong between building a statement and rendering it.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Normalize(#[from] CoreError),
}

impl PipelineError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Query(e) => e.kind(),
            Self::Normalize(_) => "normalize",
        }
    }
}

/// One rendered table.
#[derive(Debug, Clone, Serialize)]
pub struct PanelView {
    pub panel: Panel,
    /// Which query produced the rows (`recent`, `by_tenant`, ...).
    pub query: &'static str,
    /// Tenant the panel is filtered on, if any.
    pub tenant_id: Option<String>,
    pub records: Vec<DisplayRecord>,
    pub summary: String,
    pub row_count: usize,
    pub error_count_total: i64,
    /// Set when the pipeline failed; `records` is then empty.
    pub error: Option<String>,
    pub page_index: u32,
    pub offset: i64,
    /// `true` when the page came back full, so a next page may exist.
    pub has_next_page: bool,
}

impl PanelView {
    fn rendered(plan: &PlannedQuery, page: NormalizedPage) -> Self {
        let summary = page.summary.text();
        Self {
            has_next_page: page.records.len() as i64 == plan.page.page_size(),
            row_count: page.summary.row_count,
            error_count_total: page.summary.error_count_total,
            records: page.records,
            summary,
            error: None,
            ..Self::empty(plan)
        }
    }

    fn failed(plan: &PlannedQuery, err: &PipelineError) -> Self {
        let message = match &plan.shape {
            QueryShape::TenantDetail(tenant) => {
                format!("Error fetching details for tenant ID {tenant}: {err}")
            }
            _ => format!("An error occurred: {err}"),
        };
        Self {
            error: Some(message),
            ..Self::empty(plan)
        }
    }

    fn empty(plan: &PlannedQuery) -> Self {
        let tenant_id = match &plan.shape {
            QueryShape::ByTenant(t) | QueryShape::TenantDetail(t) => Some(t.as_str().to_string()),
            QueryShape::Recent | QueryShape::ByErrorThreshold(_) => None,
        };
        Self {
            panel: plan.panel,
            query: plan.shape.label(),
            tenant_id,
            records: Vec::new(),
            summary: NO_DATA_MESSAGE.to_string(),
            row_count: 0,
            error_count_total: 0,
            error: None,
            page_index: plan.page.page_index(),
            offset: plan.page.offset(),
            has_next_page: false,
        }
    }

    /// Tenant ids of the rendered rows, in row order.
    pub fn tenant_ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.tenant_id.as_str())
    }
}

/// Runs the build, execute, normalize pipeline over an [`ActivityGateway`].
pub struct ActivityService<G> {
    gateway: G,
}

impl<G: ActivityGateway> ActivityService<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Execute `plan` and normalize the result.
    pub async fn load(&self, plan: &PlannedQuery) -> Result<NormalizedPage, PipelineError> {
        let records = self
            .gateway
            .fetch_write_history(&plan.statement, &plan.scope)
            .await?;
        Ok(normalize(records)?)
    }

    /// Execute `plan` and render it, converting failures into a panel message.
    pub async fn render(&self, plan: &PlannedQuery) -> PanelView {
        match self.load(plan).await {
            Ok(page) => {
                tracing::debug!(
                    query = plan.shape.label(),
                    scope = %plan.scope,
                    page_index = plan.page.page_index(),
                    rows = page.summary.row_count,
                    "Rendered activity panel"
                );
                PanelView::rendered(plan, page)
            }
            Err(e) => {
                tracing::error!(
                    query = plan.shape.label(),
                    scope = %plan.scope,
                    page_index = plan.page.page_index(),
                    kind = e.kind(),
                    error = %e,
                    "Activity query failed"
                );
                PanelView::failed(plan, &e)
            }
        }
    }

    /// Latest runs of active tenants.
    pub async fn recent(&self, page: PageState) -> PanelView {
        self.render(&PlannedQuery::new(Panel::Master, QueryShape::Recent, page))
            .await
    }

    /// Master panel for any filter. Fails only on an invalid filter.
    pub async fn search(
        &self,
        filter: &ActivityFilter,
        page: PageState,
    ) -> Result<PanelView, CoreError> {
        let shape = filter.resolve()?;
        Ok(self
            .render(&PlannedQuery::new(Panel::Master, shape, page))
            .await)
    }

    /// Detail panel: the history of one tenant.
    pub async fn tenant_history(
        &self,
        tenant_id: &str,
        page: PageState,
    ) -> Result<PanelView, CoreError> {
        let tenant = TenantId::from_stored(tenant_id)?;
        Ok(self
            .render(&PlannedQuery::new(
                Panel::Detail,
                QueryShape::TenantDetail(tenant),
                page,
            ))
            .await)
    }
}
