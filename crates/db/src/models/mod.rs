//! Row structs decoded from the relational store.
//!
//! Rows are matched to struct fields by column name through `FromRow`;
//! positional access is never used.

pub mod write_history;
