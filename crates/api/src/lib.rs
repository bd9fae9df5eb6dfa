//! Tenant activity API server library.
//!
//! Exposes the building blocks (config, state, the activity pipeline, view
//! sessions, routes) so integration tests and the binary entrypoint can both
//! access them.

pub mod activity;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod sessions;
pub mod state;
