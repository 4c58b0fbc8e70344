//! Table writer
//!
//! Guards the sink: empty tables never reach it and dry runs stop here.

use crate::adapters::database::traits::TableSink;
use crate::config::schema::WriteMode;
use crate::core::transform::Table;
use crate::domain::WriteError;

/// What happened to one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Nothing to write; the sink was not called
    Skipped,
    /// Dry run; the sink was not called
    DryRun { rows: u64 },
    /// Rows inserted by the sink
    Written { rows: u64 },
}

impl WriteOutcome {
    /// Rows written, or rows that would have been written in a dry run
    pub fn rows(self) -> u64 {
        match self {
            Self::Skipped => 0,
            Self::DryRun { rows } | Self::Written { rows } => rows,
        }
    }
}

/// Write `table` to `table_name` with `mode`
///
/// An empty table is never written, so a replace can not wipe an existing
/// table with nothing.
///
/// # Errors
///
/// Returns the sink's [`WriteError`], which names `table_name`.
pub async fn write_table(
    sink: &dyn TableSink,
    table: &Table,
    table_name: &str,
    mode: WriteMode,
    dry_run: bool,
) -> Result<WriteOutcome, WriteError> {
    if table.is_empty() {
        tracing::warn!(table = %table_name, "Table is empty, skipping write");
        return Ok(WriteOutcome::Skipped);
    }

    let rows = table.row_count() as u64;

    if dry_run {
        tracing::info!(
            table = %table_name,
            rows,
            columns = table.column_count(),
            mode = %mode,
            "DRY RUN: Would write {} rows to {}",
            rows,
            table_name
        );
        return Ok(WriteOutcome::DryRun { rows });
    }

    match sink.bulk_write(table_name, table, mode).await {
        Ok(written) => {
            tracing::info!(
                table = %table_name,
                rows = written,
                mode = %mode,
                "Table written"
            );
            Ok(WriteOutcome::Written { rows: written })
        }
        Err(e) => {
            tracing::error!(table = %e.table(), error = %e, "Table write failed");
            Err(e)
        }
    }
}
