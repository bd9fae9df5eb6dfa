//! Per-view pagination state machine.
//!
//! A view is one open dashboard page: a master table driven by a filter and
//! an optional detail table showing the history of the tenant whose row was
//! activated. Each table owns its own [`PageState`]; the detail table is
//! keyed by tenant id and never reads the master offset.
//!
//! [`ViewState::apply`] turns a UI event into the next [`PlannedQuery`]. It
//! performs no I/O; the caller executes the query and reports the rendered
//! master rows back through [`ViewState::record_master_rows`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pagination::PageState;
use crate::query::{ActivityFilter, QueryShape, Statement, DEFAULT_ERROR_THRESHOLD};
use crate::scope::{TenantId, TenantScope};

/// Which dashboard page a view renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Tenant activity: recent runs, or runs of a searched tenant.
    Activity,
    /// Runs at or above an error-rate threshold.
    ErrorRate,
}

impl ViewKind {
    /// Filter applied when the view first opens.
    pub fn initial_filter(self) -> ActivityFilter {
        match self {
            Self::Activity => ActivityFilter::Recent,
            Self::ErrorRate => ActivityFilter::ByErrorThreshold {
                threshold: DEFAULT_ERROR_THRESHOLD,
            },
        }
    }

    fn accepts(self, filter: &ActivityFilter) -> bool {
        match self {
            Self::Activity => matches!(
                filter,
                ActivityFilter::Recent | ActivityFilter::ByTenant { .. }
            ),
            Self::ErrorRate => matches!(filter, ActivityFilter::ByErrorThreshold { .. }),
        }
    }
}

/// A user interaction dispatched into a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    FilterChanged { filter: ActivityFilter },
    NextPage,
    PrevPage,
    RowActivated { row_index: usize },
    DetailNextPage,
    DetailPrevPage,
}

/// The table a planned query populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Master,
    Detail,
}

/// A statement to execute, with everything needed to run and render it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedQuery {
    pub panel: Panel,
    pub shape: QueryShape,
    pub page: PageState,
    pub scope: TenantScope,
    pub statement: Statement,
}

impl PlannedQuery {
    pub fn new(panel: Panel, shape: QueryShape, page: PageState) -> Self {
        let statement = shape.build(&page);
        let scope = shape.scope();
        Self {
            panel,
            shape,
            page,
            scope,
            statement,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DetailState {
    tenant: TenantId,
    page: PageState,
}

/// State of one open view.
#[derive(Debug, Clone)]
pub struct ViewState {
    kind: ViewKind,
    filter: ActivityFilter,
    shape: QueryShape,
    master: PageState,
    /// Tenant ids of the last rendered master page, by row index.
    master_tenants: Vec<String>,
    detail: Option<DetailState>,
}

impl ViewState {
    pub fn new(kind: ViewKind) -> Self {
        let filter = kind.initial_filter();
        // Initial filters are constants and always resolve.
        let shape = filter.resolve().unwrap_or(QueryShape::Recent);
        Self {
            kind,
            filter,
            shape,
            master: PageState::default(),
            master_tenants: Vec::new(),
            detail: None,
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn filter(&self) -> &ActivityFilter {
        &self.filter
    }

    pub fn master_page(&self) -> PageState {
        self.master
    }

    pub fn detail_page(&self) -> Option<PageState> {
        self.detail.as_ref().map(|d| d.page)
    }

    pub fn detail_tenant(&self) -> Option<&TenantId> {
        self.detail.as_ref().map(|d| &d.tenant)
    }

    /// The master query for the current state.
    pub fn master_query(&self) -> PlannedQuery {
        PlannedQuery::new(Panel::Master, self.shape.clone(), self.master)
    }

    fn detail_query(&self) -> Result<PlannedQuery, CoreError> {
        let detail = self
            .detail
            .as_ref()
            .ok_or_else(|| CoreError::Validation("No row has been activated".into()))?;
        Ok(PlannedQuery::new(
            Panel::Detail,
            QueryShape::TenantDetail(detail.tenant.clone()),
            detail.page,
        ))
    }

    /// Apply an event and return the query it triggers.
    ///
    /// On error the state is left unchanged.
    pub fn apply(&mut self, event: &ViewEvent) -> Result<PlannedQuery, CoreError> {
        match event {
            ViewEvent::FilterChanged { filter } => {
                if !self.kind.accepts(filter) {
                    return Err(CoreError::Validation(format!(
                        "Filter {filter:?} is not available in the {:?} view",
                        self.kind
                    )));
                }
                self.shape = filter.resolve()?;
                self.filter = filter.clone();
                self.master.reset();
                self.master_tenants.clear();
                self.detail = None;
                Ok(self.master_query())
            }
            ViewEvent::NextPage => {
                self.master.next();
                Ok(self.master_query())
            }
            ViewEvent::PrevPage => {
                self.master.prev();
                Ok(self.master_query())
            }
            ViewEvent::RowActivated { row_index } => {
                let raw = self.master_tenants.get(*row_index).ok_or_else(|| {
                    CoreError::Validation(format!(
                        "Row {row_index} is not on the current page ({} rows)",
                        self.master_tenants.len()
                    ))
                })?;
                let tenant = TenantId::from_stored(raw)?;
                let same_tenant = self.detail.as_ref().is_some_and(|d| d.tenant == tenant);
                if !same_tenant {
                    self.detail = Some(DetailState {
                        tenant,
                        page: PageState::default(),
                    });
                }
                self.detail_query()
            }
            ViewEvent::DetailNextPage => {
                self.detail_query()?;
                if let Some(detail) = &mut self.detail {
                    detail.page.next();
                }
                self.detail_query()
            }
            ViewEvent::DetailPrevPage => {
                self.detail_query()?;
                if let Some(detail) = &mut self.detail {
                    detail.page.prev();
                }
                self.detail_query()
            }
        }
    }

    /// Remember the tenant ids of the master page that was just rendered.
    pub fn record_master_rows<I, S>(&mut self, tenant_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.master_tenants = tenant_ids.into_iter().map(Into::into).collect();
    }

    /// Forget the rendered master rows (the table is empty after a failure).
    pub fn clear_master_rows(&mut self) {
        self.master_tenants.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
