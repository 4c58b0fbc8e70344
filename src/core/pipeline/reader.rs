//! Document reader
//!
//! Thin wrapper around [`DocumentSource::find`] that defaults the filter, adds
//! database/collection context to failures and logs what was read.

use crate::adapters::database::traits::DocumentSource;
use crate::domain::{ConnectivityError, Document, Filter, Result};

/// Read every document in `database.collection` matching `query`
///
/// A `None` query matches all documents. Either every matching document is
/// returned or an error is; there are no partial results.
///
/// # Errors
///
/// Returns [`crate::domain::SluiceError::Connectivity`] when the source cannot
/// run the query. Bare connection failures are rewrapped as
/// [`ConnectivityError::QueryFailed`] so the database and collection are named.
pub async fn read_documents(
    source: &dyn DocumentSource,
    database: &str,
    collection: &str,
    query: Option<&Filter>,
) -> Result<Vec<Document>> {
    let empty = Filter::new();
    let filter = query.unwrap_or(&empty);

    tracing::debug!(
        database = %database,
        collection = %collection,
        filter = %serde_json::Value::Object(filter.clone()),
        "Querying source collection"
    );

    let documents = source
        .find(database, collection, filter)
        .await
        .map_err(|e| match e {
            ConnectivityError::ConnectionFailed(message) => ConnectivityError::QueryFailed {
                database: database.to_string(),
                collection: collection.to_string(),
                message,
            },
            other => other,
        })?;

    tracing::info!(
        database = %database,
        collection = %collection,
        documents = documents.len(),
        "Read documents"
    );

    Ok(documents)
}
