//! Core data model: fields, rows, datasets and key column sets

use crate::error::{Result, TabreconError};
use crate::normalize::{normalize, CompositeKey, NormalizedValue};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which input a row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Old,
    New,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Old => "old",
            Side::New => "new",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cell: raw text for display, normalized form for comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    raw: Option<String>,
    normalized: NormalizedValue,
}

impl Field {
    pub fn new(raw: Option<String>) -> Self {
        let normalized = normalize(raw.as_deref());
        Self { raw, normalized }
    }

    pub fn missing() -> Self {
        Self::new(None)
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn normalized(&self) -> &NormalizedValue {
        &self.normalized
    }
}

/// Ordered, de-duplicated column names of one input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: IndexSet<String>,
}

impl Schema {
    /// Build from header names. Returns the first repeated name on failure.
    pub fn from_columns<I, S>(columns: I) -> std::result::Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = IndexSet::new();
        for column in columns {
            let column = column.into();
            if !set.insert(column.clone()) {
                return Err(column);
            }
        }
        Ok(Self { columns: set })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.get_index_of(column)
    }

    pub fn name(&self, position: usize) -> Option<&str> {
        self.columns.get_index(position).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|s| s.as_str())
    }
}

/// One data row, fields aligned with its dataset's [`Schema`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    side: Side,
    line: u64,
    fields: Vec<Field>,
}

impl Row {
    pub fn new(side: Side, line: u64, fields: Vec<Field>) -> Self {
        Self { side, line, fields }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// 1-based line of the record in its source
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn field_at(&self, position: usize) -> Option<&Field> {
        self.fields.get(position)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Composite key for this row. Key columns absent from the schema
    /// contribute a missing component.
    pub fn composite_key(&self, schema: &Schema, key_columns: &KeyColumns) -> CompositeKey {
        let missing = NormalizedValue::Missing;
        CompositeKey::from_components(key_columns.iter().map(|column| {
            schema
                .position(column)
                .and_then(|pos| self.fields.get(pos))
                .map(|f| f.normalized())
                .unwrap_or(&missing)
        }))
    }
}

/// A row together with the schema needed to look fields up by name
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    schema: &'a Schema,
    row: &'a Row,
}

impl<'a> RowRef<'a> {
    pub fn new(schema: &'a Schema, row: &'a Row) -> Self {
        Self { schema, row }
    }

    pub fn row(&self) -> &'a Row {
        self.row
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn line(&self) -> u64 {
        self.row.line
    }

    pub fn side(&self) -> Side {
        self.row.side
    }

    pub fn get(&self, column: &str) -> Option<&'a Field> {
        let row = self.row;
        self.schema.position(column).and_then(|pos| row.fields.get(pos))
    }

    /// Raw value of a column; `None` when the cell or the column is missing
    pub fn raw(&self, column: &str) -> Option<&'a str> {
        self.get(column).and_then(|f| f.raw())
    }

    /// Columns in declared order with their raw values
    pub fn values(&self) -> impl Iterator<Item = (&'a str, Option<&'a str>)> + 'a {
        let (schema, row) = (self.schema, self.row);
        schema
            .iter()
            .enumerate()
            .map(move |(i, name)| (name, row.fields.get(i).and_then(|f| f.raw())))
    }
}

/// A loaded input: schema plus the row arena
#[derive(Debug, Clone)]
pub struct Dataset {
    label: String,
    side: Side,
    schema: Schema,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, side: Side, schema: Schema, rows: Vec<Row>) -> Self {
        Self {
            label: label.into(),
            side,
            schema,
            rows,
        }
    }

    /// Display name of the input (usually its path)
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        self.rows.get(index).map(|row| RowRef::new(&self.schema, row))
    }
}

/// Ordered, non-empty, duplicate-free key column names.
/// Order is part of the key's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyColumns(Vec<String>);

impl KeyColumns {
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(TabreconError::invalid_input("At least one key column is required"));
        }
        let mut seen = IndexSet::new();
        for column in &columns {
            if column.is_empty() {
                return Err(TabreconError::invalid_input("Key column names cannot be empty"));
            }
            if !seen.insert(column.as_str()) {
                return Err(TabreconError::invalid_input(format!(
                    "Key column '{}' listed more than once",
                    column
                )));
            }
        }
        Ok(Self(columns))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.iter().any(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for KeyColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}
