//! In-memory source and sink shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use sluice::adapters::database::{DocumentSource, TableSink};
use sluice::config::{CollectionConfig, WriteMode};
use sluice::core::pipeline::RunSettings;
use sluice::core::transform::Table;
use sluice::domain::{ConnectivityError, Document, Filter, WriteError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;

/// Convert `json!` objects into documents
pub fn documents(values: Vec<Value>) -> Vec<Document> {
    values
        .into_iter()
        .map(|v| v.as_object().cloned().expect("test document must be an object"))
        .collect()
}

#[derive(Default)]
pub struct MemorySource {
    collections: HashMap<String, Vec<Document>>,
    failing: Vec<String>,
    pub queries: Mutex<Vec<(String, String, Filter)>>,
    pub closed: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, name: &str, values: Vec<Value>) -> Self {
        self.collections.insert(name.to_string(), documents(values));
        self
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn find(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, ConnectivityError> {
        self.queries.lock().unwrap().push((
            database.to_string(),
            collection.to_string(),
            filter.clone(),
        ));

        if self.failing.iter().any(|c| c == collection) {
            return Err(ConnectivityError::ConnectionFailed(
                "server selection timed out".to_string(),
            ));
        }

        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }

    fn describe(&self) -> String {
        "memory://source".to_string()
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub tables: Mutex<HashMap<String, Table>>,
    pub modes: Mutex<Vec<(String, WriteMode)>>,
    pub calls: AtomicUsize,
    pub disposed: AtomicUsize,
    failing: Vec<String>,
    /// Sends `true` on this channel after the first successful write
    shutdown_after_write: Option<watch::Sender<bool>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, table: &str) -> Self {
        self.failing.push(table.to_string());
        self
    }

    pub fn shutdown_after_write(mut self, sender: watch::Sender<bool>) -> Self {
        self.shutdown_after_write = Some(sender);
        self
    }

    pub fn table(&self, name: &str) -> Option<Table> {
        self.tables.lock().unwrap().get(name).cloned()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn dispose_count(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TableSink for MemorySink {
    async fn bulk_write(
        &self,
        table_name: &str,
        table: &Table,
        mode: WriteMode,
    ) -> Result<u64, WriteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.iter().any(|t| t == table_name) {
            return Err(WriteError::Statement {
                table: table_name.to_string(),
                message: "permission denied for schema public".to_string(),
            });
        }

        self.modes
            .lock()
            .unwrap()
            .push((table_name.to_string(), mode));

        let mut tables = self.tables.lock().unwrap();
        match (mode, tables.get_mut(table_name)) {
            (WriteMode::Append, Some(existing)) => {
                let mut records = existing.to_records();
                records.extend(table.to_records());
                *existing = Table::from_records(records);
            }
            _ => {
                tables.insert(table_name.to_string(), table.clone());
            }
        }
        drop(tables);

        if let Some(sender) = &self.shutdown_after_write {
            let _ = sender.send(true);
        }

        Ok(table.row_count() as u64)
    }

    async fn dispose(&self) {
        self.disposed.fetch_add(1, Ordering::SeqCst);
    }

    fn describe(&self) -> String {
        "memory://sink".to_string()
    }
}

/// Settings for the given `(collection, key)` pairs against database `odds`
pub fn settings(pairs: &[(&str, &str)]) -> RunSettings {
    RunSettings {
        database: "odds".to_string(),
        collections: pairs
            .iter()
            .map(|(name, key)| CollectionConfig::new(*name, *key))
            .collect(),
        write_mode: WriteMode::Replace,
        dry_run: false,
    }
}
