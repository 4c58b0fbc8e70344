//! Source and sink factory
//!
//! This module builds the concrete source and sink from configuration and
//! hands them out as trait objects.

use crate::adapters::database::traits::{DocumentSource, TableSink};
use crate::adapters::mongodb::MongoDocumentSource;
use crate::adapters::postgresql::{PostgresClient, PostgresTableSink};
use crate::config::schema::{DestinationConfig, SourceConfig};
use crate::config::SluiceConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Connect to the MongoDB source
///
/// # Errors
///
/// Returns a connectivity error if the server cannot be reached.
pub async fn create_source(config: &SourceConfig) -> Result<Arc<dyn DocumentSource>> {
    tracing::info!("Creating MongoDB source");
    let source = MongoDocumentSource::connect(config).await?;
    Ok(Arc::new(source) as Arc<dyn DocumentSource>)
}

/// Connect to the PostgreSQL destination
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the connection
/// test fails.
pub async fn create_sink(config: &DestinationConfig) -> Result<Arc<dyn TableSink>> {
    tracing::info!("Creating PostgreSQL sink");
    let client = PostgresClient::new(config.clone())?;
    if let Err(e) = client.test_connection().await {
        client.close();
        return Err(e);
    }
    Ok(Arc::new(PostgresTableSink::new(client)) as Arc<dyn TableSink>)
}

/// Connect both ends of the pipeline
///
/// If the sink cannot be created, the already-open source is closed before
/// the error is returned.
///
/// # Errors
///
/// Returns the first connection error.
pub async fn connect(config: &SluiceConfig) -> Result<(Arc<dyn DocumentSource>, Arc<dyn TableSink>)> {
    let source = create_source(&config.source).await?;

    match create_sink(&config.destination).await {
        Ok(sink) => Ok((source, sink)),
        Err(e) => {
            source.close().await;
            Err(e)
        }
    }
}
