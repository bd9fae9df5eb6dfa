//! Tenant scoping for database access.
//!
//! A tenant's relational data lives in a schema named after the tenant, and
//! its analytical data in a database of the same name. Neither a schema nor a
//! database name can be sent as a bound parameter, so tenant ids are
//! validated here before they are allowed to select an isolation boundary.
//! Ids read back from stored rows are only ever compared as bound values and
//! skip the identifier check.

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

/// Maximum identifier length accepted by PostgreSQL (NAMEDATALEN - 1).
pub const MAX_TENANT_ID_LEN: usize = 63;

/// Schema used for global (non-tenant) queries.
pub const PUBLIC_SCHEMA: &str = "public";

/// A tenant identifier.
///
/// [`TenantId::parse`] accepts only ASCII alphanumerics, `_` and `-`, which
/// keeps the value safe to embed in a quoted identifier.
/// [`TenantId::from_stored`] accepts whatever a stored row holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Validate and wrap a tenant id. Surrounding whitespace is trimmed.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("Tenant id must not be empty".into()));
        }
        if trimmed.len() > MAX_TENANT_ID_LEN {
            return Err(CoreError::Validation(format!(
                "Tenant id must be at most {MAX_TENANT_ID_LEN} characters"
            )));
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(CoreError::Validation(format!(
                "Tenant id contains invalid character '{bad}'"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wrap a tenant id taken from a stored row, for use as a bound value.
    ///
    /// Only blank ids are rejected.
    pub fn from_stored(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("Tenant id must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The namespace a statement runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantScope {
    /// Global queries against the `public` schema.
    Public,
    /// Queries resolved against the tenant's own schema first.
    Tenant(TenantId),
}

impl TenantScope {
    /// Value for PostgreSQL's `search_path` setting.
    ///
    /// Tenant schemas fall back to `public` so shared objects stay visible.
    pub fn search_path(&self) -> String {
        match self {
            Self::Public => PUBLIC_SCHEMA.to_string(),
            Self::Tenant(id) => format!(
                "\"{}\", {PUBLIC_SCHEMA}",
                id.as_str().replace('"', "\"\"")
            ),
        }
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str(PUBLIC_SCHEMA),
            Self::Tenant(id) => write!(f, "tenant:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_accepts_typical_ids() {
        assert_eq!(TenantId::parse("acme_corp").unwrap().as_str(), "acme_corp");
        assert_eq!(
            TenantId::parse("  9f1c-44aa  ").unwrap().as_str(),
            "9f1c-44aa"
        );
    }

    #[test]
    fn parse_rejects_empty_and_whitespace() {
        assert_matches!(TenantId::parse(""), Err(CoreError::Validation(_)));
        assert_matches!(TenantId::parse("   "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn parse_rejects_identifier_breakouts() {
        assert_matches!(
            TenantId::parse("acme\", pg_catalog"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(TenantId::parse("a;drop"), Err(CoreError::Validation(_)));
        assert_matches!(TenantId::parse("a b"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn parse_rejects_overlong_ids() {
        let long = "a".repeat(MAX_TENANT_ID_LEN + 1);
        assert_matches!(TenantId::parse(&long), Err(CoreError::Validation(_)));
        assert!(TenantId::parse(&"a".repeat(MAX_TENANT_ID_LEN)).is_ok());
    }

    #[test]
    fn search_path_quotes_tenant_schema() {
        let scope = TenantScope::Tenant(TenantId::parse("acme").unwrap());
        assert_eq!(scope.search_path(), "\"acme\", public");
        assert_eq!(TenantScope::Public.search_path(), "public");
    }

    #[test]
    fn from_stored_keeps_ids_parse_would_reject() {
        let id = TenantId::from_stored(" acme corp.io ").unwrap();
        assert_eq!(id.as_str(), "acme corp.io");
        assert!(TenantId::parse("acme corp.io").is_err());

        assert_matches!(TenantId::from_stored("  "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn search_path_escapes_embedded_quotes() {
        let scope = TenantScope::Tenant(TenantId::from_stored("a\"b").unwrap());
        assert_eq!(scope.search_path(), "\"a\"\"b\", public");
    }
}
