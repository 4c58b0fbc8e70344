//! BSON to JSON conversion
//!
//! Documents are handed to the pipeline as `serde_json` maps. Native BSON
//! types without a JSON counterpart are rendered as plain strings where that
//! is lossless enough for a table cell (object ids, dates, decimals) and as
//! relaxed extended JSON otherwise.

use crate::domain::{ConnectivityError, Document, Filter};
use ::mongodb::bson::{Bson, Document as BsonDocument};
use serde_json::{Number, Value};

/// Convert a BSON document to a JSON document, keeping field order
pub fn document_to_json(document: BsonDocument) -> Document {
    document
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect()
}

/// Convert one BSON value
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::from(i),
        Bson::Int64(i) => Value::from(i),
        Bson::Double(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        Bson::String(s) => Value::String(s),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(document) => Value::Object(document_to_json(document)),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or_else(|_| Value::from(dt.timestamp_millis())),
        decimal @ Bson::Decimal128(_) => match decimal.into_relaxed_extjson() {
            Value::Object(mut wrapped) => wrapped.remove("$numberDecimal").unwrap_or(Value::Null),
            other => other,
        },
        other => other.into_relaxed_extjson(),
    }
}

/// Convert a JSON filter to a BSON query document
///
/// Extended JSON operators such as `{"$date": ...}` or `{"$oid": ...}` are
/// parsed into their native BSON types.
///
/// # Errors
///
/// Returns [`ConnectivityError::InvalidFilter`] if the filter is not valid
/// extended JSON.
pub fn filter_to_bson(filter: &Filter) -> Result<BsonDocument, ConnectivityError> {
    match Bson::try_from(Value::Object(filter.clone())) {
        Ok(Bson::Document(document)) => Ok(document),
        Ok(other) => Err(ConnectivityError::InvalidFilter(format!(
            "filter must be a document, got {other}"
        ))),
        Err(e) => Err(ConnectivityError::InvalidFilter(e.to_string())),
    }
}
