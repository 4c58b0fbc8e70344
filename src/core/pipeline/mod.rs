//! Pipeline orchestration
//!
//! This module provides the run loop for Sluice, including:
//! - Reading documents from the source
//! - Writing flattened tables to the sink
//! - Run coordination and summary reporting

pub mod reader;
pub mod runner;
pub mod summary;
pub mod writer;

pub use reader::read_documents;
pub use runner::{PipelineRunner, RunSettings};
pub use summary::{CollectionReport, CollectionStatus, FailureKind, PipelineFailure, RunSummary};
pub use writer::{write_table, WriteOutcome};
