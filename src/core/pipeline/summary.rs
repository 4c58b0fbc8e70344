//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting pipeline results.

use crate::domain::{ConnectivityError, SluiceError};
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

/// Final state of one `(collection, key)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Rows were written to the destination
    Written,
    /// Dry run: rows were produced but not written
    DryRun,
    /// The query matched no documents
    NoDocuments,
    /// Documents were read but the extraction rule yielded nothing
    NoRecords,
    /// Flattening produced a table with no rows or columns
    EmptyTable,
    /// Reading or writing failed
    Failed,
}

impl CollectionStatus {
    pub fn is_skipped(self) -> bool {
        matches!(self, Self::NoDocuments | Self::NoRecords | Self::EmptyTable)
    }
}

/// Per-pair report
#[derive(Debug, Clone)]
pub struct CollectionReport {
    /// Source collection
    pub collection: String,

    /// Extraction key
    pub key: String,

    /// Destination table
    pub table: String,

    pub status: CollectionStatus,

    /// Documents read from the source
    pub documents: usize,

    /// Records produced by extraction
    pub records: usize,

    /// Rows written (or that would be written in a dry run)
    pub rows: u64,

    /// Columns in the flattened table
    pub columns: usize,

    pub duration: Duration,
}

impl CollectionReport {
    /// Create a report for a pair that has not produced anything yet
    pub fn new(collection: &str, key: &str, table: &str) -> Self {
        Self {
            collection: collection.to_string(),
            key: key.to_string(),
            table: table.to_string(),
            status: CollectionStatus::Failed,
            documents: 0,
            records: 0,
            rows: 0,
            columns: 0,
            duration: Duration::ZERO,
        }
    }

    pub fn with_status(mut self, status: CollectionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Identifier attached to every log line of the run
    pub run_id: Uuid,

    pub started_at: DateTime<Utc>,

    /// Pairs attempted, including failed ones
    pub collections_processed: usize,

    /// Pairs written (or dry-run)
    pub collections_written: usize,

    /// Pairs skipped because nothing was found
    pub collections_skipped: usize,

    /// Pairs that failed
    pub collections_failed: usize,

    /// Rows written across all tables
    pub total_rows: u64,

    pub duration: Duration,

    pub reports: Vec<CollectionReport>,

    pub errors: Vec<PipelineFailure>,

    /// Stopped early by a shutdown signal
    pub interrupted: bool,

    pub dry_run: bool,
}

impl RunSummary {
    /// Create a new empty run summary
    pub fn new(run_id: Uuid, dry_run: bool) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            collections_processed: 0,
            collections_written: 0,
            collections_skipped: 0,
            collections_failed: 0,
            total_rows: 0,
            duration: Duration::ZERO,
            reports: Vec::new(),
            errors: Vec::new(),
            interrupted: false,
            dry_run,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a finished pair and update the counters
    pub fn add_report(&mut self, report: CollectionReport) {
        self.collections_processed += 1;
        match report.status {
            CollectionStatus::Written | CollectionStatus::DryRun => {
                self.collections_written += 1;
                self.total_rows += report.rows;
            }
            CollectionStatus::Failed => self.collections_failed += 1,
            CollectionStatus::NoDocuments
            | CollectionStatus::NoRecords
            | CollectionStatus::EmptyTable => self.collections_skipped += 1,
        }
        self.reports.push(report);
    }

    /// Add an error
    pub fn add_error(&mut self, error: PipelineFailure) {
        self.errors.push(error);
    }

    /// True when no pair failed and the run was not interrupted
    pub fn is_successful(&self) -> bool {
        self.collections_failed == 0 && self.errors.is_empty() && !self.interrupted
    }

    /// Process exit code for this run
    ///
    /// `130` when interrupted, `1` when any pair failed, `0` otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            130
        } else if self.collections_failed > 0 || !self.errors.is_empty() {
            1
        } else {
            0
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            processed = self.collections_processed,
            written = self.collections_written,
            skipped = self.collections_skipped,
            failed = self.collections_failed,
            total_rows = self.total_rows,
            duration_secs = self.duration.as_secs_f64(),
            interrupted = self.interrupted,
            dry_run = self.dry_run,
            "Pipeline run completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Pipeline run completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = error.context.as_deref().unwrap_or(""),
                    "Pipeline error"
                );
            }
        }
    }
}

/// Category of a pipeline failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Source unreachable
    Connection,
    /// Source query failed or filter was rejected
    Query,
    /// Malformed document
    Extraction,
    /// Destination write failed
    Write,
    /// Configuration error
    Configuration,
    /// Unknown error
    Unknown,
}

impl From<&SluiceError> for FailureKind {
    fn from(error: &SluiceError) -> Self {
        match error {
            SluiceError::Connectivity(ConnectivityError::ConnectionFailed(_)) => Self::Connection,
            SluiceError::Connectivity(_) => Self::Query,
            SluiceError::Extraction(_) => Self::Extraction,
            SluiceError::Write(_) => Self::Write,
            SluiceError::Configuration(_) => Self::Configuration,
            SluiceError::Serialization(_) | SluiceError::Io(_) | SluiceError::Other(_) => {
                Self::Unknown
            }
        }
    }
}

/// Pipeline error with context
#[derive(Debug, Clone)]
pub struct PipelineFailure {
    pub error_type: FailureKind,

    pub message: String,

    /// Optional context (collection, key, table)
    pub context: Option<String>,
}

impl PipelineFailure {
    pub fn new(error_type: FailureKind, message: String) -> Self {
        Self {
            error_type,
            message,
            context: None,
        }
    }

    /// Build a failure from an error, keeping its category
    pub fn from_error(error: &SluiceError) -> Self {
        Self::new(FailureKind::from(error), error.to_string())
    }

    /// Add context to the error
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}
