//! Document model
//!
//! Documents arrive from the source store as schemaless nested mappings and are
//! handled as `serde_json` maps from the adapter boundary onwards.

use serde_json::{Map, Value};

/// A schemaless, arbitrarily nested document read from the source store
pub type Document = Map<String, Value>;

/// A document-shaped unit produced by an extraction rule, ready for flattening
pub type Record = Map<String, Value>;

/// Structured match expression passed to the source (`{}` matches everything)
pub type Filter = Map<String, Value>;

/// Follow `path` through nested mappings, returning `None` at the first gap
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use sluice::domain::document::lookup;
///
/// let doc = json!({"sport_event": {"id": "sr:sport_event:1"}});
/// let doc = doc.as_object().unwrap();
/// assert_eq!(lookup(doc, &["sport_event", "id"]), Some(&json!("sr:sport_event:1")));
/// assert_eq!(lookup(doc, &["sport_event", "venue", "id"]), None);
/// ```
pub fn lookup<'a>(doc: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = doc.get(*first)?;
    for key in rest {
        current = current.as_object()?.get(*key)?;
    }
    Some(current)
}

/// Like [`lookup`] but yields `Value::Null` for anything absent
pub fn lookup_or_null(doc: &Map<String, Value>, path: &[&str]) -> Value {
    lookup(doc, path).cloned().unwrap_or(Value::Null)
}
