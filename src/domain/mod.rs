//! Domain models and types for Sluice.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Document aliases** ([`Document`], [`Record`], [`Filter`]) over `serde_json` maps
//! - **Collection kinds** ([`CollectionKind`]) selecting extraction rules and table names
//! - **Error types** ([`SluiceError`], [`ConnectivityError`], [`ExtractionError`], [`WriteError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SluiceError>`]:
//!
//! ```rust
//! use sluice::domain::{Result, SluiceError};
//!
//! fn example() -> Result<()> {
//!     let _config = sluice::config::load_config("sluice.toml")?;
//!     Ok(())
//! }
//! ```

pub mod collection;
pub mod document;
pub mod errors;
pub mod result;

// Re-export commonly used types for convenience
pub use collection::CollectionKind;
pub use document::{Document, Filter, Record};
pub use errors::{ConnectivityError, ExtractionError, SluiceError, WriteError};
pub use result::Result;
