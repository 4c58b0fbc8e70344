//! Record flattening
//!
//! Turns a homogeneous list of nested records into a flat [`Table`]:
//!
//! - a column holding mappings is normalized into `<column>_<key>` sub-columns
//! - a column holding sequences of mappings (or of sequences) is exploded into
//!   one row per element and then normalized
//!
//! Columns waiting to be inspected live on an explicit worklist, so arbitrarily
//! deep documents never recurse. The loop ends when no column holds a mapping or
//! a sequence containing mappings or sequences. Sequences of scalars are left as
//! cell values.

use super::table::Table;
use crate::domain::document::Record;
use serde_json::{Map, Value};
use std::collections::{HashSet, VecDeque};

/// What a column needs before it is flat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnShape {
    /// Only scalars, scalar sequences and nulls
    Flat,
    /// At least one mapping
    Mapping,
    /// At least one sequence containing mappings or sequences
    Nested,
}

/// Flatten `records` into a table, dropping any derived column named in `pruned`
///
/// Empty input yields an empty table (no columns, no rows).
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use sluice::core::transform::flatten::flatten;
///
/// let record = json!({"id": 1, "competitors": [{"id": "a"}, {"id": "b"}]});
/// let table = flatten(vec![record.as_object().cloned().unwrap()], &[]);
///
/// assert_eq!(table.columns(), &["id", "competitors_id"]);
/// assert_eq!(table.rows(), &[vec![json!(1), json!("a")], vec![json!(1), json!("b")]]);
/// ```
pub fn flatten(records: Vec<Record>, pruned: &[&str]) -> Table {
    if records.is_empty() {
        return Table::default();
    }

    let record_count = records.len();
    let mut table = Table::from_records(records);
    let mut pending: VecDeque<String> = table.columns().iter().cloned().collect();

    while let Some(column) = pending.pop_front() {
        let Some(index) = table.column_index(&column) else {
            continue;
        };

        match classify(table.column_values(index)) {
            ColumnShape::Flat => {}
            ColumnShape::Mapping => {
                let derived = normalize_column(&mut table, index, pruned);
                pending.extend(derived);
            }
            ColumnShape::Nested => {
                explode_column(&mut table, index);
                // The exploded column now holds single elements; inspect it again
                // before anything else so its sub-columns follow their parent.
                pending.push_front(column);
            }
        }
    }

    tracing::debug!(
        records = record_count,
        rows = table.row_count(),
        columns = table.column_count(),
        "Flattened records"
    );

    table
}

fn classify<'a>(values: impl Iterator<Item = &'a Value>) -> ColumnShape {
    let mut has_mapping = false;
    for value in values {
        match value {
            Value::Array(items) if items.iter().any(|i| i.is_object() || i.is_array()) => {
                return ColumnShape::Nested;
            }
            Value::Object(_) => has_mapping = true,
            _ => {}
        }
    }

    if has_mapping {
        ColumnShape::Mapping
    } else {
        ColumnShape::Flat
    }
}

/// Replace the mapping column at `index` with one column per nested key
///
/// Rows whose cell is not a mapping get nulls in every sub-column. Returns the
/// names of the columns that were added.
fn normalize_column(table: &mut Table, index: usize, pruned: &[&str]) -> Vec<String> {
    let parent = table.columns()[index].clone();
    let (mut cells, dropped) = mapping_cells(table.take_column(index));
    if dropped > 0 {
        tracing::warn!(
            column = %parent,
            dropped,
            "Scalar values in a mapping column were replaced by nulls"
        );
    }

    let mut keys: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for map in cells.iter().flatten() {
        for key in map.keys() {
            if seen.insert(key.as_str()) {
                keys.push(key.clone());
            }
        }
    }

    let mut derived = Vec::with_capacity(keys.len());
    for key in keys {
        let name = format!("{parent}_{key}");
        if pruned.contains(&name.as_str()) {
            tracing::trace!(column = %name, "Pruning derived column");
            continue;
        }

        let values = cells
            .iter_mut()
            .map(|cell| {
                cell.as_mut()
                    .and_then(|map| map.remove(&key))
                    .unwrap_or(Value::Null)
            })
            .collect();

        let name = table.unique_column_name(name);
        table.push_column(name.clone(), values);
        derived.push(name);
    }

    derived
}

/// Split a column into its mapping cells, counting the non-null scalars that
/// have no place in the derived sub-columns
fn mapping_cells(column: Vec<Value>) -> (Vec<Option<Map<String, Value>>>, usize) {
    let mut dropped = 0;
    let cells = column
        .into_iter()
        .map(|cell| match cell {
            Value::Object(map) => Some(map),
            Value::Null => None,
            _ => {
                dropped += 1;
                None
            }
        })
        .collect();
    (cells, dropped)
}

/// Repeat each row once per element of its sequence cell at `index`
///
/// An empty sequence keeps its row with a null cell; non-sequence cells are left
/// untouched. Row order follows the source sequence order.
fn explode_column(table: &mut Table, index: usize) {
    let rows = table.take_rows();
    let mut exploded = Vec::with_capacity(rows.len());

    for mut row in rows {
        match std::mem::take(&mut row[index]) {
            Value::Array(mut items) => {
                let Some(last) = items.pop() else {
                    exploded.push(row);
                    continue;
                };
                for item in items {
                    let mut copy = row.clone();
                    copy[index] = item;
                    exploded.push(copy);
                }
                row[index] = last;
                exploded.push(row);
            }
            other => {
                row[index] = other;
                exploded.push(row);
            }
        }
    }

    table.replace_rows(exploded);
}
