//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted file logs with rotation
//! - Configurable log levels, overridable through `RUST_LOG`
//! - Helper macros that keep collection-level log fields consistent
//!
//! # Example
//!
//! ```no_run
//! use sluice::logging::init_logging;
//! use sluice::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of one `(collection, key)` pass
///
/// # Example
///
/// ```
/// use sluice::log_collection_start;
///
/// log_collection_start!("sport_event_markets", "markets");
/// ```
#[macro_export]
macro_rules! log_collection_start {
    ($collection:expr, $key:expr) => {
        tracing::info!(
            collection = %$collection,
            key = %$key,
            "Starting collection"
        );
    };
}

/// Log the completion of one `(collection, key)` pass
///
/// # Example
///
/// ```
/// use sluice::log_collection_complete;
/// use std::time::Duration;
///
/// log_collection_complete!("outcomes", "sport_event_markets_outcomes", 120, Duration::from_millis(850));
/// ```
#[macro_export]
macro_rules! log_collection_complete {
    ($collection:expr, $table:expr, $rows:expr, $duration:expr) => {
        tracing::info!(
            collection = %$collection,
            table = %$table,
            rows = $rows,
            duration_ms = $duration.as_millis() as u64,
            "Collection finished"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```
/// use sluice::log_error_with_context;
/// use sluice::domain::SluiceError;
///
/// let error = SluiceError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}
