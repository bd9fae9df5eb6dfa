//! Domain logic for the tenant activity dashboard.
//!
//! Everything in this crate is pure: query construction, tenant scoping,
//! timestamp normalization and the per-view pagination state machine. The
//! `tenantwatch-db` crate executes what this crate builds, and
//! `tenantwatch-api` exposes it over HTTP.

pub mod display_time;
pub mod error;
pub mod normalize;
pub mod pagination;
pub mod query;
pub mod scope;
pub mod types;
pub mod view;
pub mod write_history;
