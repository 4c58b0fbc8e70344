//! Pipeline runner - main orchestrator for a run
//!
//! Drives every configured `(collection, key)` pair through
//! read → extract → flatten → write, one pair at a time.

use crate::adapters::database::traits::{DocumentSource, TableSink};
use crate::config::schema::{CollectionConfig, WriteMode};
use crate::config::SluiceConfig;
use crate::core::pipeline::reader::read_documents;
use crate::core::pipeline::summary::{
    CollectionReport, CollectionStatus, PipelineFailure, RunSummary,
};
use crate::core::pipeline::writer::{write_table, WriteOutcome};
use crate::core::transform::{transform_documents, Transformed};
use crate::domain::Result;
use crate::{log_collection_complete, log_collection_start, log_error_with_context};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

/// What a run does, independent of where it reads and writes
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Source database name
    pub database: String,

    /// Pairs to process, in order
    pub collections: Vec<CollectionConfig>,

    pub write_mode: WriteMode,

    pub dry_run: bool,
}

impl RunSettings {
    /// Take run settings from a validated configuration
    pub fn from_config(config: &SluiceConfig) -> Self {
        Self {
            database: config.source.database.clone(),
            collections: config.pipeline.collections.clone(),
            write_mode: config.pipeline.write_mode,
            dry_run: config.application.dry_run,
        }
    }
}

/// Pipeline runner
///
/// Owns one source and one sink for the duration of a run and releases both
/// when [`PipelineRunner::run`] returns, whatever the outcome.
pub struct PipelineRunner {
    source: Arc<dyn DocumentSource>,
    sink: Arc<dyn TableSink>,
    settings: RunSettings,
    shutdown_signal: watch::Receiver<bool>,
}

impl PipelineRunner {
    /// Create a new pipeline runner
    pub fn new(
        source: Arc<dyn DocumentSource>,
        sink: Arc<dyn TableSink>,
        settings: RunSettings,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            source,
            sink,
            settings,
            shutdown_signal,
        }
    }

    /// Execute the run
    ///
    /// Never fails as a whole: per-pair failures are recorded in the returned
    /// [`RunSummary`] and the run moves on to the next pair. The shutdown
    /// signal is checked before each pair.
    pub async fn run(self) -> RunSummary {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", run_id = %run_id);
        self.execute(run_id).instrument(span).await
    }

    async fn execute(self, run_id: Uuid) -> RunSummary {
        let start_time = Instant::now();
        let mut summary = RunSummary::new(run_id, self.settings.dry_run);

        tracing::info!(
            source = %self.source.describe(),
            destination = %self.sink.describe(),
            database = %self.settings.database,
            collections = self.settings.collections.len(),
            write_mode = %self.settings.write_mode,
            dry_run = self.settings.dry_run,
            "Starting pipeline run"
        );

        for collection in &self.settings.collections {
            if *self.shutdown_signal.borrow() {
                tracing::warn!(
                    remaining = self.settings.collections.len() - summary.collections_processed,
                    "Shutdown requested, stopping before next collection"
                );
                summary.interrupted = true;
                break;
            }

            let started = Instant::now();
            let mut report =
                CollectionReport::new(&collection.name, &collection.key, &collection.table_name());

            if let Err(e) = self.process_collection(collection, &mut report).await {
                let context = format!(
                    "collection={}, key={}, table={}",
                    collection.name, collection.key, report.table
                );
                log_error_with_context!(e, context);
                report.status = CollectionStatus::Failed;
                summary.add_error(PipelineFailure::from_error(&e).with_context(context));
            }

            summary.add_report(report.with_duration(started.elapsed()));
        }

        self.source.close().await;
        self.sink.dispose().await;

        summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        summary
    }

    /// Process one pair, filling in `report` as it goes
    async fn process_collection(
        &self,
        collection: &CollectionConfig,
        report: &mut CollectionReport,
    ) -> Result<()> {
        let started = Instant::now();
        let kind = collection.kind();

        log_collection_start!(collection.name, collection.key);

        let documents = read_documents(
            self.source.as_ref(),
            &self.settings.database,
            &collection.name,
            collection.query.as_ref(),
        )
        .await?;
        report.documents = documents.len();

        if documents.is_empty() {
            tracing::warn!(
                collection = %collection.name,
                key = %collection.key,
                "No documents found, skipping collection"
            );
            report.status = CollectionStatus::NoDocuments;
            return Ok(());
        }

        let Transformed { records, table } = transform_documents(documents, kind, &collection.key);
        report.records = records;

        if records == 0 {
            tracing::warn!(
                collection = %collection.name,
                key = %collection.key,
                kind = %kind,
                "Extraction produced no records, skipping collection"
            );
            report.status = CollectionStatus::NoRecords;
            return Ok(());
        }

        report.columns = table.column_count();

        tracing::debug!(
            collection = %collection.name,
            rows = table.row_count(),
            columns = table.column_count(),
            "Flattened records"
        );

        let outcome = write_table(
            self.sink.as_ref(),
            &table,
            &report.table,
            self.settings.write_mode,
            self.settings.dry_run,
        )
        .await?;

        report.rows = outcome.rows();
        report.status = match outcome {
            WriteOutcome::Skipped => CollectionStatus::EmptyTable,
            WriteOutcome::DryRun { .. } => CollectionStatus::DryRun,
            WriteOutcome::Written { .. } => CollectionStatus::Written,
        };

        log_collection_complete!(collection.name, report.table, report.rows, started.elapsed());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transform::Table;
    use crate::domain::{ConnectivityError, Document, Filter, WriteError};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySource {
        collections: HashMap<String, Vec<Document>>,
        failing: Vec<String>,
        closed: AtomicUsize,
    }

    impl MemorySource {
        fn with(mut self, name: &str, documents: Vec<Value>) -> Self {
            let documents = documents
                .into_iter()
                .filter_map(|v| v.as_object().cloned())
                .collect();
            self.collections.insert(name.to_string(), documents);
            self
        }
    }

    #[async_trait]
    impl DocumentSource for MemorySource {
        async fn find(
            &self,
            database: &str,
            collection: &str,
            _filter: &Filter,
        ) -> std::result::Result<Vec<Document>, ConnectivityError> {
            if self.failing.iter().any(|c| c == collection) {
                return Err(ConnectivityError::QueryFailed {
                    database: database.to_string(),
                    collection: collection.to_string(),
                    message: "cursor killed".to_string(),
                });
            }
            Ok(self.collections.get(collection).cloned().unwrap_or_default())
        }

        async fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    #[derive(Default)]
    struct MemorySink {
        tables: Mutex<HashMap<String, Table>>,
        disposed: AtomicUsize,
    }

    #[async_trait]
    impl TableSink for MemorySink {
        async fn bulk_write(
            &self,
            table_name: &str,
            table: &Table,
            _mode: WriteMode,
        ) -> std::result::Result<u64, WriteError> {
            self.tables
                .lock()
                .unwrap()
                .insert(table_name.to_string(), table.clone());
            Ok(table.row_count() as u64)
        }

        async fn dispose(&self) {
            self.disposed.fetch_add(1, Ordering::SeqCst);
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    fn settings(pairs: &[(&str, &str)]) -> RunSettings {
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

    #[tokio::test]
    async fn test_run_writes_each_pair() {
        let source = Arc::new(MemorySource::default().with(
            "competition_schedules",
            vec![json!({"schedules": [{"sport_event": {"id": "s1"}}]})],
        ));
        let sink = Arc::new(MemorySink::default());
        let (_tx, rx) = watch::channel(false);

        let runner = PipelineRunner::new(
            source.clone(),
            sink.clone(),
            settings(&[("competition_schedules", "schedules")]),
            rx,
        );
        let summary = runner.run().await;

        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.collections_written, 1);
        assert_eq!(summary.total_rows, 1);

        let tables = sink.tables.lock().unwrap();
        let table = tables.get("schedules").unwrap();
        assert_eq!(table.columns(), &["id".to_string()]);
        assert_eq!(table.get(0, "id"), Some(&json!("s1")));

        assert_eq!(source.closed.load(Ordering::SeqCst), 1);
        assert_eq!(sink.disposed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let source = Arc::new(MemorySource {
            failing: vec!["broken".to_string()],
            ..MemorySource::default()
        }
        .with("sports", vec![json!({"sports": [{"id": "sr:sport:1"}]})]));
        let sink = Arc::new(MemorySink::default());
        let (_tx, rx) = watch::channel(false);

        let summary = PipelineRunner::new(
            source.clone(),
            sink.clone(),
            settings(&[("broken", "broken"), ("sports", "sports")]),
            rx,
        )
        .run()
        .await;

        assert_eq!(summary.collections_failed, 1);
        assert_eq!(summary.collections_written, 1);
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(
            summary.errors[0].context.as_deref(),
            Some("collection=broken, key=broken, table=broken")
        );
        assert!(sink.tables.lock().unwrap().contains_key("sports"));
        assert_eq!(source.closed.load(Ordering::SeqCst), 1);
        assert_eq!(sink.disposed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_interrupted_before_first_pair() {
        let source = Arc::new(MemorySource::default());
        let sink = Arc::new(MemorySink::default());
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let summary = PipelineRunner::new(
            source.clone(),
            sink.clone(),
            settings(&[("sports", "sports")]),
            rx,
        )
        .run()
        .await;

        assert!(summary.interrupted);
        assert_eq!(summary.collections_processed, 0);
        assert_eq!(summary.exit_code(), 130);
        assert_eq!(source.closed.load(Ordering::SeqCst), 1);
        assert_eq!(sink.disposed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_collection_is_skipped() {
        let source = Arc::new(MemorySource::default());
        let sink = Arc::new(MemorySink::default());
        let (_tx, rx) = watch::channel(false);

        let summary = PipelineRunner::new(
            source,
            sink.clone(),
            settings(&[("sports", "sports")]),
            rx,
        )
        .run()
        .await;

        assert_eq!(summary.collections_skipped, 1);
        assert_eq!(summary.reports[0].status, CollectionStatus::NoDocuments);
        assert_eq!(summary.exit_code(), 0);
        assert!(sink.tables.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_yields_no_records() {
        let source = Arc::new(
            MemorySource::default().with("sports", vec![json!({"generated_at": "today"})]),
        );
        let sink = Arc::new(MemorySink::default());
        let (_tx, rx) = watch::channel(false);

        let summary = PipelineRunner::new(
            source,
            sink.clone(),
            settings(&[("sports", "sports")]),
            rx,
        )
        .run()
        .await;

        assert_eq!(summary.reports[0].status, CollectionStatus::NoRecords);
        assert_eq!(summary.reports[0].documents, 1);
        assert!(sink.tables.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let source = Arc::new(
            MemorySource::default().with("sports", vec![json!({"sports": [{"id": 1}, {"id": 2}]})]),
        );
        let sink = Arc::new(MemorySink::default());
        let (_tx, rx) = watch::channel(false);
        let mut settings = settings(&[("sports", "sports")]);
        settings.dry_run = true;

        let summary = PipelineRunner::new(source, sink.clone(), settings, rx)
            .run()
            .await;

        assert!(summary.dry_run);
        assert_eq!(summary.reports[0].status, CollectionStatus::DryRun);
        assert_eq!(summary.total_rows, 2);
        assert!(sink.tables.lock().unwrap().is_empty());
        assert_eq!(sink.disposed.load(Ordering::SeqCst), 1);
    }
}
