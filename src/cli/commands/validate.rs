//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Sluice configuration file.

use crate::config::{load_config, redact_uri};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already validates; a failure here is reported as a
    /// configuration error (exit code 2).
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!(
            "  Source: {}",
            redact_uri(config.source.uri.expose_secret().as_ref())
        );
        println!("  Source Database: {}", config.source.database);
        println!(
            "  Destination: {}",
            redact_uri(config.destination.connection_string.expose_secret().as_ref())
        );
        println!("  Max Connections: {}", config.destination.max_connections);
        println!("  Insert Chunk Size: {}", config.destination.insert_chunk_size);
        println!("  Write Mode: {}", config.pipeline.write_mode);
        println!("  Collections:");
        for collection in &config.pipeline.collections {
            println!(
                "    - {} [{}] ({}) -> {}",
                collection.name,
                collection.key,
                collection.kind(),
                collection.table_name()
            );
        }
        println!();

        Ok(0)
    }
}
