//! Table layout and SQL generation
//!
//! Maps a flattened [`Table`] onto PostgreSQL: one inferred column type per
//! column, quoted identifiers, and multi-row `INSERT` statements sized to stay
//! under the bind-parameter limit.
//!
//! When appending to an existing table the layout is reconciled with the
//! catalog first: existing column types win when they can hold the batch,
//! otherwise the column is widened, and missing columns are added.

use crate::core::transform::Table;
use serde_json::Value;
use tokio_postgres::types::ToSql;

/// PostgreSQL caps a single statement at this many bind parameters
pub const MAX_BIND_PARAMETERS: usize = 65535;

/// A bound parameter that can be held across an `.await`
pub type SqlParam = Box<dyn ToSql + Sync + Send>;

/// Column type inferred from the non-null cells of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Boolean,
    BigInt,
    Double,
    Text,
    Jsonb,
}

impl SqlType {
    /// Infer the column type from its cells
    ///
    /// Nulls are ignored. Any sequence or mapping makes the column `JSONB`;
    /// otherwise mixed scalar kinds fall back to `TEXT`, as does a column
    /// with no values at all.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut booleans = 0usize;
        let mut integers = 0usize;
        let mut floats = 0usize;
        let mut strings = 0usize;

        for value in values {
            match value {
                Value::Null => {}
                Value::Bool(_) => booleans += 1,
                Value::Number(n) if n.is_i64() => integers += 1,
                Value::Number(_) => floats += 1,
                Value::String(_) => strings += 1,
                Value::Array(_) | Value::Object(_) => return Self::Jsonb,
            }
        }

        match (booleans, integers, floats, strings) {
            (0, 0, 0, 0) => Self::Text,
            (_, 0, 0, 0) => Self::Boolean,
            (0, _, 0, 0) => Self::BigInt,
            (0, _, _, 0) => Self::Double,
            _ => Self::Text,
        }
    }

    /// Map an `information_schema.columns.data_type` value onto a bindable type
    ///
    /// Only types whose bind parameters match exactly are recognised.
    pub fn from_catalog(data_type: &str) -> Option<Self> {
        match data_type {
            "boolean" => Some(Self::Boolean),
            "bigint" => Some(Self::BigInt),
            "double precision" => Some(Self::Double),
            "text" | "character varying" => Some(Self::Text),
            "jsonb" | "json" => Some(Self::Jsonb),
            _ => None,
        }
    }

    /// Narrowest type able to hold both existing `self` values and `incoming` ones
    pub fn widen(self, incoming: SqlType) -> SqlType {
        match (self, incoming) {
            (current, incoming) if current == incoming => current,
            (Self::Text, _) => Self::Text,
            (Self::Jsonb, _) | (_, Self::Jsonb) => Self::Jsonb,
            (Self::BigInt, Self::Double) | (Self::Double, Self::BigInt) => Self::Double,
            _ => Self::Text,
        }
    }

    /// `USING` expression converting an existing column to this type
    fn conversion(self, column: &str) -> String {
        match self {
            Self::Jsonb => format!("to_jsonb({column})"),
            other => format!("{column}::{}", other.as_sql()),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::BigInt => "BIGINT",
            Self::Double => "DOUBLE PRECISION",
            Self::Text => "TEXT",
            Self::Jsonb => "JSONB",
        }
    }

    /// Convert one cell into a bind parameter of this type
    pub fn to_param(self, value: &Value) -> SqlParam {
        match self {
            Self::Boolean => Box::new(value.as_bool()),
            Self::BigInt => Box::new(value.as_i64()),
            Self::Double => Box::new(value.as_f64()),
            Self::Text => Box::new(match value {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }),
            Self::Jsonb => Box::new(match value {
                Value::Null => None,
                other => Some(other.clone()),
            }),
        }
    }
}

/// Quote an identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: SqlType,
    /// Whether the batch holds any non-null cell for this column
    pub has_values: bool,
}

/// Destination layout of one flattened table
#[derive(Debug, Clone)]
pub struct TableLayout {
    table_name: String,
    columns: Vec<ColumnDef>,
}

impl TableLayout {
    /// Infer the layout of `table` for `table_name`
    pub fn infer(table_name: &str, table: &Table) -> Self {
        let columns = table
            .columns()
            .iter()
            .enumerate()
            .map(|(index, name)| ColumnDef {
                name: name.clone(),
                sql_type: SqlType::infer(table.column_values(index)),
                has_values: table.column_values(index).any(|v| !v.is_null()),
            })
            .collect();

        Self {
            table_name: table_name.to_string(),
            columns,
        }
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Align the layout with the columns already in the destination table
    ///
    /// `existing` holds `(column_name, data_type)` pairs as reported by
    /// `information_schema.columns`. Returns the `ALTER TABLE` statements to run
    /// before inserting; afterwards every column binds with the type the table
    /// will hold.
    pub fn reconcile(&mut self, existing: &[(String, String)]) -> Vec<String> {
        let table = quote_ident(&self.table_name);
        let mut statements = Vec::new();

        for column in &mut self.columns {
            let ident = quote_ident(&column.name);

            let Some((_, data_type)) = existing.iter().find(|(name, _)| *name == column.name)
            else {
                statements.push(format!(
                    "ALTER TABLE {table} ADD COLUMN {ident} {}",
                    column.sql_type.as_sql()
                ));
                continue;
            };

            let Some(current) = SqlType::from_catalog(data_type) else {
                tracing::warn!(
                    table = %self.table_name,
                    column = %column.name,
                    data_type = %data_type,
                    "Existing column type is not managed by sluice, binding inferred type"
                );
                continue;
            };

            let target = if column.has_values {
                current.widen(column.sql_type)
            } else {
                current
            };

            if target != current {
                statements.push(format!(
                    "ALTER TABLE {table} ALTER COLUMN {ident} TYPE {} USING {}",
                    target.as_sql(),
                    target.conversion(&ident)
                ));
            }
            column.sql_type = target;
        }

        statements
    }

    pub fn drop_table_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_ident(&self.table_name))
    }

    pub fn create_table_sql(&self, if_not_exists: bool) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.sql_type.as_sql()))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "CREATE TABLE {}{} ({})",
            if if_not_exists { "IF NOT EXISTS " } else { "" },
            quote_ident(&self.table_name),
            columns
        )
    }

    /// `INSERT` for `row_count` rows with positional parameters
    pub fn insert_sql(&self, row_count: usize) -> String {
        let width = self.columns.len();
        let columns = self
            .columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", ");

        let values = (0..row_count)
            .map(|row| {
                let placeholders = (1..=width)
                    .map(|col| format!("${}", row * width + col))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({placeholders})")
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES {}",
            quote_ident(&self.table_name),
            columns,
            values
        )
    }

    /// Rows per `INSERT`, bounded by `chunk_size` and the parameter limit
    pub fn rows_per_statement(&self, chunk_size: usize) -> usize {
        let width = self.columns.len().max(1);
        chunk_size.min(MAX_BIND_PARAMETERS / width).max(1)
    }

    /// Bind parameters for a run of rows, row-major
    pub fn params(&self, rows: &[Vec<Value>]) -> Vec<SqlParam> {
        rows.iter()
            .flat_map(|row| {
                self.columns
                    .iter()
                    .enumerate()
                    .map(move |(index, column)| {
                        column
                            .sql_type
                            .to_param(row.get(index).unwrap_or(&Value::Null))
                    })
            })
            .collect()
    }
}
