//! Storage abstraction layer
//!
//! This module provides the trait-based seam between the pipeline and the
//! stores it reads from and writes to.

pub mod factory;
pub mod traits;

pub use factory::{connect, create_sink, create_source};
pub use traits::{DocumentSource, TableSink};
