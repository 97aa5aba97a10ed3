//! Composite-key indexing of a dataset

use crate::model::{Dataset, KeyColumns, RowRef, Schema, Side};
use crate::normalize::CompositeKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A key seen more than once in one input. The later row replaced the earlier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateKey {
    pub key: CompositeKey,
    pub kept_line: u64,
    pub replaced_line: u64,
}

/// A row whose key normalized to nothing; it takes no part in reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyError {
    pub line: u64,
    pub raw_key: Vec<Option<String>>,
}

impl KeyError {
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self
            .raw_key
            .iter()
            .map(|v| match v {
                Some(s) => format!("{:?}", s),
                None => "<missing>".to_string(),
            })
            .collect();
        format!("empty key from [{}]", parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    pub side: Side,
    pub duplicates: Vec<DuplicateKey>,
    pub key_errors: Vec<KeyError>,
}

impl IndexReport {
    pub fn has_issues(&self) -> bool {
        !self.duplicates.is_empty() || !self.key_errors.is_empty()
    }
}

/// Unique composite key → row position, iterated in ascending key order.
/// Owns the dataset it indexes.
#[derive(Debug, Clone)]
pub struct KeyIndex {
    dataset: Dataset,
    key_columns: KeyColumns,
    entries: BTreeMap<CompositeKey, usize>,
}

impl KeyIndex {
    pub fn side(&self) -> Side {
        self.dataset.side()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn schema(&self) -> &Schema {
        self.dataset.schema()
    }

    pub fn key_columns(&self) -> &KeyColumns {
        &self.key_columns
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &CompositeKey) -> Option<RowRef<'_>> {
        self.entries.get(key).and_then(|&pos| self.dataset.row(pos))
    }

    pub fn keys(&self) -> impl Iterator<Item = &CompositeKey> {
        self.entries.keys()
    }

    /// `(key, row position)` pairs in ascending key order
    pub fn entries(&self) -> impl Iterator<Item = (&CompositeKey, usize)> {
        self.entries.iter().map(|(k, &pos)| (k, pos))
    }

    pub(crate) fn into_parts(self) -> (Dataset, KeyColumns, BTreeMap<CompositeKey, usize>) {
        (self.dataset, self.key_columns, self.entries)
    }
}

/// Index every row by its composite key.
///
/// Rows with an empty key go to `key_errors`. On a duplicate key the last
/// occurrence wins and the earlier one is recorded.
pub fn build_index(dataset: Dataset, key_columns: &KeyColumns) -> (KeyIndex, IndexReport) {
    let mut entries: BTreeMap<CompositeKey, usize> = BTreeMap::new();
    let mut duplicates = Vec::new();
    let mut key_errors = Vec::new();

    let schema = dataset.schema();
    for (pos, row) in dataset.rows().iter().enumerate() {
        let key = row.composite_key(schema, key_columns);
        if key.is_empty() {
            let view = RowRef::new(schema, row);
            key_errors.push(KeyError {
                line: row.line(),
                raw_key: key_columns
                    .iter()
                    .map(|c| view.raw(c).map(str::to_string))
                    .collect(),
            });
            continue;
        }

        if let Some(previous) = entries.insert(key.clone(), pos) {
            let replaced_line = dataset.rows()[previous].line();
            log::debug!(
                "{}: duplicate key '{}' at line {} replaces line {}",
                dataset.label(),
                key,
                row.line(),
                replaced_line
            );
            duplicates.push(DuplicateKey {
                key,
                kept_line: row.line(),
                replaced_line,
            });
        }
    }

    if !duplicates.is_empty() || !key_errors.is_empty() {
        log::warn!(
            "{}: {} duplicate keys, {} rows with empty keys",
            dataset.label(),
            duplicates.len(),
            key_errors.len()
        );
    }

    let report = IndexReport {
        side: dataset.side(),
        duplicates,
        key_errors,
    };
    let index = KeyIndex {
        dataset,
        key_columns: key_columns.clone(),
        entries,
    };
    (index, report)
}
