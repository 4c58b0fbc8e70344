//! Domain error types
//!
//! This module defines the error hierarchy for Sluice. Errors are domain-specific
//! and never expose third-party driver types; driver failures are flattened into
//! messages at the adapter boundary.

use thiserror::Error;

/// Main Sluice error type
///
/// This is the primary error type used throughout the application.
/// It wraps the per-stage error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum SluiceError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Document source errors
    #[error("Connectivity error: {0}")]
    Connectivity(#[from] ConnectivityError),

    /// Extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Destination write errors
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Document source errors
///
/// Raised when the document store is unreachable or a query cannot be executed.
#[derive(Debug, Error)]
pub enum ConnectivityError {
    /// Failed to connect to the document store
    #[error("Failed to connect to document store: {0}")]
    ConnectionFailed(String),

    /// A find query failed while executing or draining its cursor
    #[error("Query on {database}.{collection} failed: {message}")]
    QueryFailed {
        database: String,
        collection: String,
        message: String,
    },

    /// The filter could not be converted into a source query
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

/// Extraction errors
///
/// Reserved for document shapes that are malformed beyond what the missing-key
/// tolerance absorbs. Absent or wrong-typed fields are treated as empty and never
/// produce this error.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// A document could not be interpreted for the collection
    #[error("Malformed document in collection '{collection}': {message}")]
    MalformedDocument { collection: String, message: String },
}

/// Destination write errors
///
/// Always carries the name of the table that was being written.
#[derive(Debug, Error)]
pub enum WriteError {
    /// No connection could be obtained for the write
    #[error("Failed to acquire connection for table '{table}': {message}")]
    Connection { table: String, message: String },

    /// A DDL or INSERT statement failed
    #[error("Failed to write table '{table}': {message}")]
    Statement { table: String, message: String },
}

impl WriteError {
    /// Name of the destination table the failed write targeted
    pub fn table(&self) -> &str {
        match self {
            WriteError::Connection { table, .. } | WriteError::Statement { table, .. } => table,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SluiceError {
    fn from(err: std::io::Error) -> Self {
        SluiceError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SluiceError {
    fn from(err: serde_json::Error) -> Self {
        SluiceError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SluiceError {
    fn from(err: toml::de::Error) -> Self {
        SluiceError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sluice_error_display() {
        let err = SluiceError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_connectivity_error_conversion() {
        let err = ConnectivityError::QueryFailed {
            database: "odds".to_string(),
            collection: "sports".to_string(),
            message: "cursor killed".to_string(),
        };
        let sluice_err: SluiceError = err.into();
        assert!(matches!(sluice_err, SluiceError::Connectivity(_)));
        assert!(sluice_err.to_string().contains("odds.sports"));
    }

    #[test]
    fn test_write_error_carries_table() {
        let err = WriteError::Statement {
            table: "sport_event_markets".to_string(),
            message: "relation is locked".to_string(),
        };
        assert_eq!(err.table(), "sport_event_markets");
        assert!(err.to_string().contains("'sport_event_markets'"));

        let sluice_err: SluiceError = err.into();
        assert!(matches!(sluice_err, SluiceError::Write(_)));
    }

    #[test]
    fn test_extraction_error_conversion() {
        let err = ExtractionError::MalformedDocument {
            collection: "outcomes".to_string(),
            message: "markets is a string".to_string(),
        };
        let sluice_err: SluiceError = err.into();
        assert!(matches!(sluice_err, SluiceError::Extraction(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let sluice_err: SluiceError = io_err.into();
        assert!(matches!(sluice_err, SluiceError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let sluice_err: SluiceError = json_err.into();
        assert!(matches!(sluice_err, SluiceError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let sluice_err: SluiceError = toml_err.into();
        assert!(matches!(sluice_err, SluiceError::Configuration(_)));
        assert!(sluice_err.to_string().contains("TOML parse error"));
    }
}
