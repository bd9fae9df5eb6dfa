//! Parameterized SQL for the write-history panels.
//!
//! Every panel reads `core_master.clickhouse_write_history` joined with
//! `core_master.tenant`. User-controlled values (tenant id, threshold, limit,
//! offset) are always bound parameters; nothing the user types is spliced
//! into SQL text.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pagination::PageState;
use crate::scope::{TenantId, TenantScope};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Error-rate thresholds (percent) offered by the dashboard.
pub const ERROR_THRESHOLD_OPTIONS: [f64; 4] = [10.0, 20.0, 30.0, 50.0];

/// Threshold preselected when the error-rate view opens.
pub const DEFAULT_ERROR_THRESHOLD: f64 = 20.0;

const FROM_CLAUSE: &str = "FROM core_master.clickhouse_write_history cwh \
     LEFT JOIN core_master.tenant tenant ON cwh.tenant_id = tenant.id";

/// Newest run first; `id` breaks ties so pages are a stable total order.
const ORDER_CLAUSE: &str = "ORDER BY cwh.finished_at DESC, cwh.id DESC";

/// `(expression, alias)` pairs of the SELECT list, shared by every shape.
///
/// Rows are decoded by alias, so this list and the row model in
/// `tenantwatch-db` must agree one-to-one. Numeric columns are cast to
/// `bigint` and text columns to `text` so decoding does not depend on the
/// physical column width.
pub const SELECT_COLUMNS: &[(&str, &str)] = &[
    ("cwh.id::bigint", "id"),
    ("cwh.tenant_id::text", "tenant_id"),
    ("cwh.records_count::bigint", "records_count"),
    ("cwh.errors_count::bigint", "error_count"),
    ("cwh.duration::bigint", "duration_ms"),
    ("cwh.db_persist_duration::bigint", "db_persist_duration_ms"),
    ("cwh.run_id::text", "run_id"),
    ("cwh.first_event_received_at::bigint", "first_event_received_at_ms"),
    ("cwh.last_event_received_at::bigint", "last_event_received_at_ms"),
    ("cwh.finished_at", "finished_at"),
    ("tenant.base_domain::text", "base_domain"),
    ("tenant.name::text", "name"),
    ("tenant.contact_email::text", "contact_email"),
];

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    Float(f64),
}

/// A named bound parameter.
///
/// PostgreSQL binds by position (`$1..$n` in declaration order); the name is
/// used for logging and for ClickHouse `{name:Type}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    pub name: &'static str,
    pub value: ParamValue,
}

/// SQL text plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<BoundParam>,
}

impl Statement {
    /// A statement with no parameters yet.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Attach a named parameter (builder style).
    pub fn with_param(mut self, name: &'static str, value: ParamValue) -> Self {
        self.params.push(BoundParam { name, value });
        self
    }

    /// Register a parameter and return its positional placeholder (`$n`).
    fn placeholder(&mut self, name: &'static str, value: ParamValue) -> String {
        self.params.push(BoundParam { name, value });
        format!("${}", self.params.len())
    }

    /// Names of the bound parameters, in binding order.
    pub fn param_names(&self) -> Vec<&'static str> {
        self.params.iter().map(|p| p.name).collect()
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// A user-facing panel filter, as received from the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ActivityFilter {
    /// Latest runs of active tenants.
    Recent,
    /// Runs of one tenant. An empty id means "no filter".
    ByTenant { tenant_id: String },
    /// Runs whose error rate meets a percentage threshold.
    ByErrorThreshold { threshold: f64 },
}

impl ActivityFilter {
    /// Validate the filter and resolve it to a concrete query shape.
    ///
    /// A blank tenant id falls back to [`QueryShape::Recent`].
    pub fn resolve(&self) -> Result<QueryShape, CoreError> {
        match self {
            Self::Recent => Ok(QueryShape::Recent),
            Self::ByTenant { tenant_id } if tenant_id.trim().is_empty() => Ok(QueryShape::Recent),
            Self::ByTenant { tenant_id } => Ok(QueryShape::ByTenant(TenantId::parse(tenant_id)?)),
            Self::ByErrorThreshold { threshold } => {
                Ok(QueryShape::ByErrorThreshold(validate_threshold(*threshold)?))
            }
        }
    }
}

/// Check that a threshold is a finite percentage in `0..=100`.
pub fn validate_threshold(threshold: f64) -> Result<f64, CoreError> {
    if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
        return Err(CoreError::Validation(format!(
            "Error threshold must be between 0 and 100, got {threshold}"
        )));
    }
    Ok(threshold)
}

/// In-process mirror of the error-threshold SQL predicate.
///
/// A comparison rather than a division, so `records_count == 0` is safe:
/// such a row matches exactly when `error_count >= 0`.
pub fn meets_error_threshold(error_count: i64, records_count: i64, threshold: f64) -> bool {
    error_count as f64 >= records_count as f64 * threshold / 100.0
}

// ---------------------------------------------------------------------------
// Query shapes
// ---------------------------------------------------------------------------

/// A validated query, ready to be built into SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryShape {
    Recent,
    ByTenant(TenantId),
    ByErrorThreshold(f64),
    /// Drill-down into one tenant's history from an activated row.
    TenantDetail(TenantId),
}

impl QueryShape {
    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::ByTenant(_) => "by_tenant",
            Self::ByErrorThreshold(_) => "by_error_threshold",
            Self::TenantDetail(_) => "tenant_detail",
        }
    }

    /// Namespace the statement runs in.
    ///
    /// Only a direct tenant search is scoped to the tenant's schema; every
    /// other shape is a global query.
    pub fn scope(&self) -> TenantScope {
        match self {
            Self::ByTenant(id) => TenantScope::Tenant(id.clone()),
            _ => TenantScope::Public,
        }
    }

    /// Build the paginated statement for this shape.
    pub fn build(&self, page: &PageState) -> Statement {
        let mut stmt = Statement::new(String::new());

        let where_clause = match self {
            Self::Recent => "WHERE tenant.deleted_date IS NULL".to_string(),
            Self::ByTenant(id) | Self::TenantDetail(id) => {
                let p = stmt.placeholder("tenant_id", ParamValue::Text(id.as_str().to_string()));
                format!("WHERE cwh.tenant_id = {p}")
            }
            Self::ByErrorThreshold(threshold) => {
                let p = stmt.placeholder("error_threshold", ParamValue::Float(*threshold));
                format!("WHERE cwh.errors_count >= (cwh.records_count * {p}::float8 / 100.0)")
            }
        };
        let limit = stmt.placeholder("limit", ParamValue::Int(page.page_size()));
        let offset = stmt.placeholder("offset", ParamValue::Int(page.offset()));

        stmt.sql = format!(
            "SELECT {} {FROM_CLAUSE} {where_clause} {ORDER_CLAUSE} LIMIT {limit} OFFSET {offset}",
            select_list()
        );
        stmt
    }
}

/// Render [`SELECT_COLUMNS`] as `expr AS alias, ...`.
fn select_list() -> String {
    SELECT_COLUMNS
        .iter()
        .map(|(expr, alias)| format!("{expr} AS {alias}"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
