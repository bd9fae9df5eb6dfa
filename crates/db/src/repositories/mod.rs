//! Repository layer.
//!
//! Repositories wrap a [`ScopedExecutor`](crate::gateway::ScopedExecutor) and
//! turn raw rows into domain records.

pub mod write_history_repo;

pub use write_history_repo::WriteHistoryRepo;
