//! Run command implementation
//!
//! This module implements the `run` command, which moves every configured
//! collection from MongoDB into PostgreSQL.

use crate::adapters::database::connect;
use crate::config::schema::{CollectionConfig, SluiceConfig, WriteMode};
use crate::core::pipeline::{PipelineRunner, RunSettings, RunSummary};
use crate::domain::SluiceError;
use clap::Args;
use std::str::FromStr;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - read and flatten without writing to PostgreSQL
    #[arg(long)]
    pub dry_run: bool,

    /// Only run these collections (comma-separated)
    #[arg(long)]
    pub collection: Option<String>,

    /// Override write mode (replace or append)
    #[arg(long)]
    pub write_mode: Option<String>,
}

impl RunArgs {
    /// Execute the run command against an already loaded configuration
    ///
    /// The binary loads the file before logging starts so the logging section
    /// can take effect; a load failure is reported here with exit code 2.
    pub async fn execute(
        &self,
        loaded: crate::domain::Result<SluiceConfig>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match loaded {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        // Apply CLI overrides
        if let Some(mode) = &self.write_mode {
            match WriteMode::from_str(mode) {
                Ok(mode) => {
                    tracing::info!(write_mode = %mode, "Overriding write mode from CLI");
                    config.pipeline.write_mode = mode;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Invalid write mode");
                    eprintln!("{e}");
                    return Ok(2);
                }
            }
        }

        if let Some(names) = &self.collection {
            match select_collections(&config.pipeline.collections, names) {
                Ok(selected) => {
                    tracing::info!(collections = %names, "Restricting run to collections from CLI");
                    config.pipeline.collections = selected;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Invalid collection selection");
                    eprintln!("{e}");
                    return Ok(2);
                }
            }
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let dry_run = config.application.dry_run;
        if dry_run {
            tracing::info!("Dry run mode enabled - no data will be written");
            println!("🔍 DRY RUN MODE - No data will be written to PostgreSQL");
            println!();
        }

        // Confirmation prompt (unless --yes or dry-run)
        if !self.yes && !dry_run {
            println!("Run Configuration:");
            println!("  Source database: {}", config.source.database);
            println!("  Write mode: {}", config.pipeline.write_mode);
            println!("  Collections:");
            for collection in &config.pipeline.collections {
                println!(
                    "    - {} [{}] -> {}",
                    collection.name,
                    collection.key,
                    collection.table_name()
                );
            }
            println!();
            print!("Proceed with run? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Run cancelled.");
                return Ok(0);
            }
        }

        let (source, sink) = match connect(&config).await {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect");
                eprintln!("Failed to connect: {e}");
                return Ok(match e {
                    SluiceError::Configuration(_) => 2,
                    _ => 4,
                });
            }
        };

        println!("🚀 Starting run...");
        println!();

        let runner =
            PipelineRunner::new(source, sink, RunSettings::from_config(&config), shutdown_signal);
        let summary = runner.run().await;

        print_summary(&summary);

        let exit_code = summary.exit_code();
        match exit_code {
            130 => {
                println!("⚠️  Run interrupted. Collections after the last completed one were not processed.");
                tracing::info!("Run interrupted by user signal");
            }
            1 => println!("⚠️  Run completed with failures"),
            _ => println!("✅ Run completed successfully!"),
        }

        Ok(exit_code)
    }
}

/// Keep the configured pairs whose collection name is in the comma-separated
/// `names` list, in configuration order
///
/// # Errors
///
/// Returns an error naming any collection that is not configured.
pub fn select_collections(
    collections: &[CollectionConfig],
    names: &str,
) -> Result<Vec<CollectionConfig>, String> {
    let wanted: Vec<&str> = names
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let unknown: Vec<&str> = wanted
        .iter()
        .copied()
        .filter(|name| !collections.iter().any(|c| c.name == *name))
        .collect();

    if !unknown.is_empty() {
        return Err(format!(
            "Collections not found in configuration: {}",
            unknown.join(", ")
        ));
    }

    Ok(collections
        .iter()
        .filter(|c| wanted.contains(&c.name.as_str()))
        .cloned()
        .collect())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("📊 Run Summary:");
    println!("  Run ID: {}", summary.run_id);
    println!("  Collections Processed: {}", summary.collections_processed);
    println!("  Written: {}", summary.collections_written);
    println!("  Skipped: {}", summary.collections_skipped);
    println!("  Failed: {}", summary.collections_failed);
    println!("  Total Rows: {}", summary.total_rows);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if !summary.reports.is_empty() {
        println!("  Tables:");
        for report in &summary.reports {
            println!(
                "    - {} -> {}: {:?} ({} rows, {} columns)",
                report.collection, report.table, report.status, report.rows, report.columns
            );
        }
        println!();
    }

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in &summary.errors {
            println!("  - {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("    Context: {context}");
            }
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    const MINIMAL: &str = r#"
[source]
uri = "mongodb://localhost:27017"

[destination]
connection_string = "postgresql://localhost/odds"

[[pipeline.collections]]
name = "sports"
key = "sports"
"#;

    #[tokio::test]
    async fn test_execute_reports_load_failure_as_config_error() {
        let (_tx, rx) = watch::channel(false);
        let loaded = Err(SluiceError::Configuration("missing file".to_string()));

        let code = RunArgs::default().execute(loaded, rx).await.unwrap();

        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_execute_rejects_bad_override_before_connecting() {
        let (_tx, rx) = watch::channel(false);
        let args = RunArgs {
            write_mode: Some("upsert".to_string()),
            ..RunArgs::default()
        };

        let code = args
            .execute(parse_config(MINIMAL, |_| None), rx)
            .await
            .unwrap();

        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_execute_rejects_unknown_collection() {
        let (_tx, rx) = watch::channel(false);
        let args = RunArgs {
            yes: true,
            collection: Some("players".to_string()),
            ..RunArgs::default()
        };

        let code = args
            .execute(parse_config(MINIMAL, |_| None), rx)
            .await
            .unwrap();

        assert_eq!(code, 2);
    }

    fn configured() -> Vec<CollectionConfig> {
        vec![
            CollectionConfig::new("sports", "sports"),
            CollectionConfig::new("sport_event_markets", "markets"),
            CollectionConfig::new("outcomes", "markets"),
        ]
    }

    #[test]
    fn test_run_args_defaults() {
        let args = RunArgs::default();

        assert!(!args.yes);
        assert!(!args.dry_run);
        assert!(args.collection.is_none());
        assert!(args.write_mode.is_none());
    }

    #[test]
    fn test_select_collections_keeps_config_order() {
        let selected = select_collections(&configured(), "outcomes, sports").unwrap();

        let names: Vec<_> = selected.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["sports", "outcomes"]);
    }

    #[test]
    fn test_select_collections_rejects_unknown() {
        let err = select_collections(&configured(), "sports,players").unwrap_err();

        assert!(err.contains("players"));
        assert!(!err.contains("sports"));
    }

    #[test]
    fn test_select_collections_keeps_every_key_of_a_collection() {
        let collections = vec![
            CollectionConfig::new("sports_competition", "competitions"),
            CollectionConfig::new("sports_competition", "seasons"),
        ];

        let selected = select_collections(&collections, "sports_competition").unwrap();

        assert_eq!(selected.len(), 2);
    }
}
