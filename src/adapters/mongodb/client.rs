//! MongoDB client implementation
//!
//! This module provides the document source backed by the official MongoDB
//! driver.

use crate::adapters::database::traits::DocumentSource;
use crate::adapters::mongodb::convert::{document_to_json, filter_to_bson};
use crate::config::redact_uri;
use crate::config::schema::SourceConfig;
use crate::domain::{ConnectivityError, Document, Filter};
use ::mongodb::bson::{doc, Document as BsonDocument};
use ::mongodb::options::ClientOptions;
use ::mongodb::Client;
use async_trait::async_trait;
use futures::TryStreamExt;
use secrecy::ExposeSecret;
use std::time::Duration;

const APP_NAME: &str = "sluice";

/// MongoDB implementation of [`DocumentSource`]
pub struct MongoDocumentSource {
    client: Client,

    /// Connection URI with credentials removed
    endpoint: String,
}

impl MongoDocumentSource {
    /// Connect to MongoDB and ping the server
    ///
    /// The ping makes a bad URI or an unreachable server fail here rather than
    /// on the first query.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectivityError::ConnectionFailed`] if the URI cannot be
    /// parsed or the server does not answer within the connect timeout.
    pub async fn connect(config: &SourceConfig) -> Result<Self, ConnectivityError> {
        let uri = config.uri.expose_secret().as_ref();
        let endpoint = redact_uri(uri);

        let mut options = ClientOptions::parse(uri).await.map_err(|e| {
            ConnectivityError::ConnectionFailed(format!("Invalid MongoDB URI {endpoint}: {e}"))
        })?;

        let timeout = Duration::from_secs(config.connect_timeout_seconds);
        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options).map_err(|e| {
            ConnectivityError::ConnectionFailed(format!(
                "Failed to create MongoDB client for {endpoint}: {e}"
            ))
        })?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| {
                ConnectivityError::ConnectionFailed(format!(
                    "MongoDB ping to {endpoint} failed: {e}"
                ))
            })?;

        tracing::info!(source = %endpoint, "MongoDB connection test successful");

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl DocumentSource for MongoDocumentSource {
    async fn find(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, ConnectivityError> {
        let query = filter_to_bson(filter)?;
        let query_failed = |e: ::mongodb::error::Error| ConnectivityError::QueryFailed {
            database: database.to_string(),
            collection: collection.to_string(),
            message: e.to_string(),
        };

        let cursor = self
            .client
            .database(database)
            .collection::<BsonDocument>(collection)
            .find(query)
            .await
            .map_err(query_failed)?;

        let documents: Vec<BsonDocument> = cursor.try_collect().await.map_err(query_failed)?;

        Ok(documents.into_iter().map(document_to_json).collect())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        tracing::debug!(source = %self.endpoint, "MongoDB client closed");
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
