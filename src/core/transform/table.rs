//! Flat table model
//!
//! A [`Table`] is an ordered column list plus rows of cells aligned to it. Cells
//! are `serde_json` values; an absent field is stored as `Value::Null`.

use crate::domain::document::Record;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Tabular output of the flattener, ready for a bulk write
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table from explicit columns and rows
    ///
    /// Rows shorter than the column list are padded with nulls and longer rows
    /// are truncated, so every row is aligned.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Build one row per record and one column per distinct top-level field
    ///
    /// Columns appear in order of first occurrence across the records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for record in &records {
            for key in record.keys() {
                if seen.insert(key.clone()) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|column| record.remove(column).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Column names in table order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows aligned to [`Table::columns`]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when there is nothing a writer could store
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` for the named column
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// Iterate the cells of one column
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Turn rows back into records, nulls included
    pub fn to_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect::<Map<String, Value>>()
            })
            .collect()
    }

    /// Remove a column and hand back its cells
    pub(crate) fn take_column(&mut self, index: usize) -> Vec<Value> {
        self.columns.remove(index);
        self.rows.iter_mut().map(|row| row.remove(index)).collect()
    }

    /// Append a column at the end; `cells` must have one entry per row
    pub(crate) fn push_column(&mut self, name: String, cells: Vec<Value>) {
        debug_assert_eq!(cells.len(), self.rows.len());
        self.columns.push(name);
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
    }

    /// Swap the row set, used when a column is exploded
    pub(crate) fn replace_rows(&mut self, rows: Vec<Vec<Value>>) {
        self.rows = rows;
    }

    pub(crate) fn take_rows(&mut self) -> Vec<Vec<Value>> {
        std::mem::take(&mut self.rows)
    }

    /// `name`, or `name_N` for the first N that does not clash with an existing column
    pub(crate) fn unique_column_name(&self, name: String) -> String {
        if self.column_index(&name).is_none() {
            return name;
        }
        (1..)
            .map(|n| format!("{name}_{n}"))
            .find(|candidate| self.column_index(candidate).is_none())
            .unwrap_or(name)
    }
}
