//! Source and sink abstraction traits
//!
//! The pipeline only talks to these two traits. Concrete adapters live next to
//! them (`mongodb`, `postgresql`); tests inject in-memory implementations.

use crate::config::schema::WriteMode;
use crate::core::transform::Table;
use crate::domain::{ConnectivityError, Document, Filter, WriteError};
use async_trait::async_trait;

/// Read side: a document store that can run a filter query
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Return every document in `database.collection` matching `filter`
    ///
    /// Never returns a partial result: a failure while draining the cursor is
    /// reported as an error and the documents read so far are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectivityError`] if the query cannot be executed.
    async fn find(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, ConnectivityError>;

    /// Release the connection; called exactly once per run
    async fn close(&self);

    /// Endpoint description safe for logs (credentials redacted)
    fn describe(&self) -> String;
}

/// Write side: a relational store that can bulk-write a flat table
#[async_trait]
pub trait TableSink: Send + Sync {
    /// Write every row of `table` into `table_name`
    ///
    /// `Replace` drops and recreates the table, `Append` creates it when
    /// missing. Either way the write is a single transaction. Returns the
    /// number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] naming `table_name` if any statement fails.
    async fn bulk_write(
        &self,
        table_name: &str,
        table: &Table,
        mode: WriteMode,
    ) -> Result<u64, WriteError>;

    /// Release the connection pool; called exactly once per run
    async fn dispose(&self);

    /// Endpoint description safe for logs (credentials redacted)
    fn describe(&self) -> String;
}
