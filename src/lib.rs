// Sluice - MongoDB to PostgreSQL unnesting ETL
// Copyright (c) 2025 Sluice Contributors
// Licensed under the MIT License

//! # Sluice - MongoDB to PostgreSQL unnesting ETL
//!
//! Sluice reads sports odds documents from MongoDB, pulls the records out of
//! each collection, flattens their nested mappings and sequences into flat
//! rows, and bulk-writes the result into PostgreSQL tables.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (pipeline runner, extraction, flattening)
//! - [`adapters`] - External integrations (MongoDB, PostgreSQL)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sluice::adapters::database::connect;
//! use sluice::config::load_config;
//! use sluice::core::pipeline::{PipelineRunner, RunSettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("sluice.toml")?;
//!     let (source, sink) = connect(&config).await?;
//!     let (_tx, shutdown) = tokio::sync::watch::channel(false);
//!
//!     let summary = PipelineRunner::new(source, sink, RunSettings::from_config(&config), shutdown)
//!         .run()
//!         .await;
//!
//!     println!("Wrote {} rows", summary.total_rows);
//!     Ok(())
//! }
//! ```
//!
//! ## Transformation
//!
//! Extraction and flattening are pure functions over `serde_json` values:
//!
//! ```rust
//! use sluice::core::transform::transform_documents;
//! use sluice::domain::CollectionKind;
//! use serde_json::json;
//!
//! let doc = json!({"sports": [{"id": 1, "details": {"country": "X", "league": "Y"}}]});
//! let table = transform_documents(
//!     vec![doc.as_object().cloned().unwrap()],
//!     CollectionKind::Generic,
//!     "sports",
//! )
//! .table;
//!
//! assert_eq!(table.columns(), &["id", "details_country", "details_league"]);
//! assert_eq!(table.row_count(), 1);
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], whose error type is
//! [`domain::SluiceError`]. The binary converts to `anyhow` at the edge.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
