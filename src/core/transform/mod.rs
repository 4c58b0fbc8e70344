//! Document transformation
//!
//! Two pure stages sit between the reader and the writer:
//!
//! - **Extract**: applies the collection-specific rule that pulls the relevant
//!   sub-list of records out of each document and stamps parent identifiers
//! - **Flatten**: normalizes nested mappings and sequences into a flat [`Table`]
//!
//! Neither stage fails on missing or empty data: absence produces empty output.

pub mod extract;
pub mod flatten;
pub mod table;

pub use extract::extract;
pub use flatten::flatten;
pub use table::Table;

use crate::domain::{CollectionKind, Document};

/// Output of both stages for one collection
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    /// Records produced by extraction; zero means the collection has nothing to load
    pub records: usize,
    pub table: Table,
}

/// Run both stages for one collection
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use sluice::core::transform::transform_documents;
/// use sluice::domain::CollectionKind;
///
/// let document = json!({"schedules": [{"sport_event": {"id": "s1"}}]});
/// let transformed = transform_documents(
///     vec![document.as_object().cloned().unwrap()],
///     CollectionKind::Schedules,
///     "schedules",
/// );
///
/// assert_eq!(transformed.records, 1);
/// assert_eq!(transformed.table.columns(), &["id"]);
/// assert_eq!(transformed.table.rows(), &[vec![json!("s1")]]);
/// ```
pub fn transform_documents(
    documents: Vec<Document>,
    kind: CollectionKind,
    extraction_key: &str,
) -> Transformed {
    let records = extract(documents, kind, extraction_key);
    let record_count = records.len();

    Transformed {
        records: record_count,
        table: flatten(records, kind.pruned_columns()),
    }
}
