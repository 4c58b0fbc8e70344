//! PostgreSQL destination integration
//!
//! This module provides the table sink that writes flattened tables into
//! PostgreSQL.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgresTableSink;
pub use client::PostgresClient;
pub use models::{SqlType, TableLayout};
