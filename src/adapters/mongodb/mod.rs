//! MongoDB source integration
//!
//! This module provides the document source that reads collections from
//! MongoDB and converts them to JSON documents.

pub mod client;
pub mod convert;

pub use client::MongoDocumentSource;
