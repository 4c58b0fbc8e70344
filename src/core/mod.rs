//! Core business logic for Sluice.
//!
//! # Modules
//!
//! - [`pipeline`] - Run orchestration, reading, writing and summary reporting
//! - [`transform`] - Per-collection extraction and nested-structure flattening
//!
//! # Run Workflow
//!
//! For each configured `(collection, key)` pair:
//!
//! 1. **Read**: Query every matching document from the source collection
//! 2. **Extract**: Pull records out of each document and stamp parent ids
//! 3. **Flatten**: Normalize nested mappings and explode nested sequences
//! 4. **Write**: Replace or append the destination table
//!
//! A failing pair is recorded in the [`pipeline::RunSummary`] and the run
//! moves on.
//!
//! # Example
//!
//! ```rust,no_run
//! use sluice::adapters::database::connect;
//! use sluice::config::load_config;
//! use sluice::core::pipeline::{PipelineRunner, RunSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("sluice.toml")?;
//! let (source, sink) = connect(&config).await?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let runner = PipelineRunner::new(source, sink, RunSettings::from_config(&config), shutdown_rx);
//! let summary = runner.run().await;
//!
//! println!("Written: {}", summary.collections_written);
//! println!("Failed: {}", summary.collections_failed);
//! # Ok(())
//! # }
//! ```

pub mod pipeline;
pub mod transform;
