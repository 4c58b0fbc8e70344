//! Collection extraction rules
//!
//! Each [`CollectionKind`] has a rule that pulls the interesting sub-sequence out
//! of a source document and stamps parent identifiers onto child records, so the
//! parent/child linkage survives flattening as plain scalar columns.
//!
//! Missing or wrong-typed fields are treated as empty: an absent extraction key
//! yields no records and an absent identifier is stamped as `null`.

use crate::domain::collection::CollectionKind;
use crate::domain::document::{lookup, lookup_or_null, Document, Record};
use serde_json::{Map, Value};

/// Stamped onto markets, outcomes and player props
pub const SPORT_EVENT_ID: &str = "sport_event_id";
/// Stamped onto outcomes
pub const MARKET_ID: &str = "market_id";
/// Stamped onto outcomes
pub const BOOKS_ID: &str = "books_id";

/// Apply the extraction rule for `kind` to every document
///
/// Returns an empty vector when nothing matches; callers use that to skip the
/// write for the collection.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use sluice::core::transform::extract::extract;
/// use sluice::domain::CollectionKind;
///
/// let doc = json!({"schedules": [{"sport_event": {"id": "s1"}}]});
/// let records = extract(
///     vec![doc.as_object().cloned().unwrap()],
///     CollectionKind::Schedules,
///     "schedules",
/// );
/// assert_eq!(records, vec![json!({"id": "s1"}).as_object().cloned().unwrap()]);
/// ```
pub fn extract(documents: Vec<Document>, kind: CollectionKind, extraction_key: &str) -> Vec<Record> {
    let document_count = documents.len();
    let mut records = Vec::new();

    for document in documents {
        match kind {
            CollectionKind::Generic => extract_generic(document, extraction_key, &mut records),
            CollectionKind::Schedules => extract_schedules(document, extraction_key, &mut records),
            CollectionKind::Markets => extract_markets(document, extraction_key, &mut records),
            CollectionKind::Outcomes => extract_outcomes(document, extraction_key, &mut records),
            CollectionKind::PlayerProps => {
                extract_player_props(document, extraction_key, &mut records)
            }
        }
    }

    tracing::debug!(
        kind = %kind,
        extraction_key = %extraction_key,
        documents = document_count,
        records = records.len(),
        "Extracted records"
    );

    records
}

fn extract_generic(mut document: Document, key: &str, out: &mut Vec<Record>) {
    match document.remove(key) {
        Some(Value::Array(items)) => out.extend(items.into_iter().map(into_record)),
        Some(Value::Object(map)) => out.push(map),
        _ => {}
    }
}

fn extract_schedules(mut document: Document, key: &str, out: &mut Vec<Record>) {
    for wrapper in take_sequence(&mut document, key) {
        if let Value::Object(mut wrapper) = wrapper {
            if let Some(Value::Object(sport_event)) = wrapper.remove("sport_event") {
                out.push(sport_event);
            }
        }
    }
}

fn extract_markets(mut document: Document, key: &str, out: &mut Vec<Record>) {
    let event_id = lookup_or_null(&document, &["sport_event", "id"]);

    for market in take_sequence(&mut document, key) {
        let Value::Object(mut market) = market else {
            continue;
        };
        stamp(&mut market, SPORT_EVENT_ID, &event_id);
        out.push(market);
    }
}

fn extract_outcomes(mut document: Document, key: &str, out: &mut Vec<Record>) {
    let event_id = lookup_or_null(&document, &["sport_event", "id"]);

    for market in take_sequence(&mut document, key) {
        let Value::Object(mut market) = market else {
            continue;
        };
        let market_id = market.get("id").cloned().unwrap_or(Value::Null);

        for book in take_sequence(&mut market, "books") {
            let Value::Object(mut book) = book else {
                continue;
            };
            let book_id = book.get("id").cloned().unwrap_or(Value::Null);

            for outcome in take_sequence(&mut book, "outcomes") {
                let Value::Object(mut outcome) = outcome else {
                    continue;
                };
                stamp(&mut outcome, SPORT_EVENT_ID, &event_id);
                stamp(&mut outcome, MARKET_ID, &market_id);
                stamp(&mut outcome, BOOKS_ID, &book_id);
                out.push(outcome);
            }
        }
    }
}

fn extract_player_props(mut document: Document, key: &str, out: &mut Vec<Record>) {
    let document_event_id = lookup_or_null(&document, &["sport_event", "id"]);

    let wrappers = match document.remove(key) {
        Some(Value::Array(items)) => items,
        Some(wrapper @ Value::Object(_)) => vec![wrapper],
        _ => Vec::new(),
    };

    for wrapper in wrappers {
        let Value::Object(mut wrapper) = wrapper else {
            continue;
        };
        let event_id = match lookup(&wrapper, &["sport_event", "id"]) {
            Some(id) if !id.is_null() => id.clone(),
            _ => document_event_id.clone(),
        };

        for prop in take_sequence(&mut wrapper, "player_props") {
            let Value::Object(mut prop) = prop else {
                continue;
            };
            stamp(&mut prop, SPORT_EVENT_ID, &event_id);
            out.push(prop);
        }
    }
}

/// Remove `key` and return its elements; anything but a sequence is empty
fn take_sequence(map: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match map.remove(key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn into_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// Write a parent identifier onto a child record
///
/// The stamp always wins so the child links to the parent it was found under.
fn stamp(record: &mut Record, field: &str, parent_id: &Value) {
    if let Some(existing) = record.get(field) {
        if existing != parent_id {
            tracing::warn!(
                field = %field,
                existing = %existing,
                stamped = %parent_id,
                "Overwriting child field with parent identifier"
            );
        }
    }
    record.insert(field.to_string(), parent_id.clone());
}
