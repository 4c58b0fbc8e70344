//! External system integrations for Sluice.
//!
//! This module provides adapters for integrating with external systems:
//!
//! - [`database`] - Source and sink traits plus the factory that builds them
//! - [`mongodb`] - MongoDB document source
//! - [`postgresql`] - PostgreSQL table sink
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-memory implementations. The pipeline only sees the
//! [`database::DocumentSource`] and [`database::TableSink`] traits.
//!
//! ```rust,no_run
//! use sluice::adapters::database::{create_sink, create_source};
//! use sluice::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("sluice.toml")?;
//!
//! let source = create_source(&config.source).await?;
//! let sink = create_sink(&config.destination).await?;
//! println!("{} -> {}", source.describe(), sink.describe());
//!
//! source.close().await;
//! sink.dispose().await;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod mongodb;
pub mod postgresql;
