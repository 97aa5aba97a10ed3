//! Report model: the four partitions, per-cell diff views and accumulated issues
//!
//! Partitions are stored as positions into the two row arenas. Views borrow
//! from the result, so renderers can stream rows without copying them.

use crate::index::IndexReport;
use crate::loader::LoadReport;
use crate::model::{Dataset, Field, KeyColumns, RowRef, Side};
use crate::normalize::CompositeKey;
use serde::{Deserialize, Serialize};

/// A column present in both schemas, with its position on each side
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedColumn {
    pub name: String,
    #[serde(skip)]
    pub(crate) old_pos: usize,
    #[serde(skip)]
    pub(crate) new_pos: usize,
}

/// A column only one side declares. Never compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMismatch {
    pub column: String,
    pub present_in: Side,
}

#[derive(Debug, Clone)]
pub(crate) struct PairEntry {
    pub key: CompositeKey,
    pub old: usize,
    pub new: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct PartialEntry {
    pub key: CompositeKey,
    pub old: usize,
    pub new: usize,
    /// One flag per shared column
    pub differs: Vec<bool>,
}

#[derive(Debug, Clone)]
pub(crate) struct SingleEntry {
    pub key: CompositeKey,
    pub row: usize,
}

/// Outcome of reconciling two key indexes. Every key from either index is in
/// exactly one partition; each partition is in ascending key order.
#[derive(Debug, Clone)]
pub struct ReconciliationResult {
    pub(crate) old: Dataset,
    pub(crate) new: Dataset,
    pub(crate) key_columns: KeyColumns,
    pub(crate) shared_columns: Vec<SharedColumn>,
    pub(crate) schema_mismatches: Vec<SchemaMismatch>,
    pub(crate) matched: Vec<PairEntry>,
    pub(crate) partial: Vec<PartialEntry>,
    pub(crate) only_old: Vec<SingleEntry>,
    pub(crate) only_new: Vec<SingleEntry>,
}

impl ReconciliationResult {
    pub fn old_dataset(&self) -> &Dataset {
        &self.old
    }

    pub fn new_dataset(&self) -> &Dataset {
        &self.new
    }

    pub fn key_columns(&self) -> &KeyColumns {
        &self.key_columns
    }

    pub fn shared_columns(&self) -> &[SharedColumn] {
        &self.shared_columns
    }

    pub fn schema_mismatches(&self) -> &[SchemaMismatch] {
        &self.schema_mismatches
    }

    /// Keys present on both sides whose shared columns all normalize equal
    pub fn matched(&self) -> impl Iterator<Item = MatchedRow<'_>> + '_ {
        self.matched.iter().map(move |e| MatchedRow {
            key: &e.key,
            old: self.old_row(e.old),
            new: self.new_row(e.new),
        })
    }

    /// Keys present on both sides with at least one differing shared column
    pub fn partial(&self) -> impl Iterator<Item = PartialRow<'_>> + '_ {
        self.partial.iter().map(move |e| PartialRow {
            key: &e.key,
            old: self.old_row(e.old),
            new: self.new_row(e.new),
            shared: &self.shared_columns,
            differs: &e.differs,
        })
    }

    pub fn only_old(&self) -> impl Iterator<Item = SingleRow<'_>> + '_ {
        self.only_old.iter().map(move |e| SingleRow {
            key: &e.key,
            row: self.old_row(e.row),
        })
    }

    pub fn only_new(&self) -> impl Iterator<Item = SingleRow<'_>> + '_ {
        self.only_new.iter().map(move |e| SingleRow {
            key: &e.key,
            row: self.new_row(e.row),
        })
    }

    pub fn matched_len(&self) -> usize {
        self.matched.len()
    }

    pub fn partial_len(&self) -> usize {
        self.partial.len()
    }

    pub fn only_old_len(&self) -> usize {
        self.only_old.len()
    }

    pub fn only_new_len(&self) -> usize {
        self.only_new.len()
    }

    /// Which partition a key landed in, if any
    pub fn classify(&self, key: &CompositeKey) -> Option<Partition> {
        let by_key = |k: &CompositeKey| k.cmp(key);
        if self.matched.binary_search_by(|e| by_key(&e.key)).is_ok() {
            Some(Partition::Matched)
        } else if self.partial.binary_search_by(|e| by_key(&e.key)).is_ok() {
            Some(Partition::Partial)
        } else if self.only_old.binary_search_by(|e| by_key(&e.key)).is_ok() {
            Some(Partition::OnlyOld)
        } else if self.only_new.binary_search_by(|e| by_key(&e.key)).is_ok() {
            Some(Partition::OnlyNew)
        } else {
            None
        }
    }

    fn old_row(&self, pos: usize) -> RowRef<'_> {
        RowRef::new(self.old.schema(), &self.old.rows()[pos])
    }

    fn new_row(&self, pos: usize) -> RowRef<'_> {
        RowRef::new(self.new.schema(), &self.new.rows()[pos])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Matched,
    Partial,
    OnlyOld,
    OnlyNew,
}

impl Partition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Matched => "matched",
            Partition::Partial => "partial",
            Partition::OnlyOld => "only_old",
            Partition::OnlyNew => "only_new",
        }
    }
}

/// A matched key. Renderers display the old row's raw values.
#[derive(Debug, Clone, Copy)]
pub struct MatchedRow<'a> {
    pub key: &'a CompositeKey,
    pub old: RowRef<'a>,
    pub new: RowRef<'a>,
}

impl<'a> MatchedRow<'a> {
    /// The values shown for a matched row
    pub fn display(&self) -> RowRef<'a> {
        self.old
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SingleRow<'a> {
    pub key: &'a CompositeKey,
    pub row: RowRef<'a>,
}

/// Comparison of one shared column for a partial row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDiff<'a> {
    pub column: &'a str,
    pub old: Option<&'a str>,
    pub new: Option<&'a str>,
    /// Normalized values differ
    pub differs: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PartialRow<'a> {
    pub key: &'a CompositeKey,
    pub old: RowRef<'a>,
    pub new: RowRef<'a>,
    shared: &'a [SharedColumn],
    differs: &'a [bool],
}

impl<'a> PartialRow<'a> {
    /// One entry per shared column, in shared-column order
    pub fn cell_diffs(&self) -> impl Iterator<Item = CellDiff<'a>> + 'a {
        let (old, new) = (self.old.row(), self.new.row());
        let (shared, differs) = (self.shared, self.differs);
        shared
            .iter()
            .zip(differs.iter())
            .map(move |(column, &differs)| CellDiff {
                column: &column.name,
                old: old.field_at(column.old_pos).and_then(Field::raw),
                new: new.field_at(column.new_pos).and_then(Field::raw),
                differs,
            })
    }

    pub fn differing_columns(&self) -> impl Iterator<Item = &'a str> + 'a {
        let (shared, differs) = (self.shared, self.differs);
        shared
            .iter()
            .zip(differs.iter())
            .filter(|(_, d)| **d)
            .map(|(c, _)| c.name.as_str())
    }

    pub fn differing_count(&self) -> usize {
        self.differs.iter().filter(|&&d| d).count()
    }
}

/// Partition and issue counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconSummary {
    pub old_rows: usize,
    pub new_rows: usize,
    pub matched: usize,
    pub partial: usize,
    pub only_old: usize,
    pub only_new: usize,
    pub malformed_rows: usize,
    pub duplicate_keys: usize,
    pub key_errors: usize,
    pub schema_mismatches: usize,
}

impl ReconSummary {
    pub fn has_differences(&self) -> bool {
        self.partial + self.only_old + self.only_new > 0
    }

    pub fn issue_count(&self) -> usize {
        self.malformed_rows + self.duplicate_keys + self.key_errors + self.schema_mismatches
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MalformedRow,
    DuplicateKey,
    KeyError,
    SchemaMismatch,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MalformedRow => "malformed_row",
            IssueKind::DuplicateKey => "duplicate_key",
            IssueKind::KeyError => "key_error",
            IssueKind::SchemaMismatch => "schema_mismatch",
        }
    }
}

/// A recovered problem, flattened for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub side: Side,
    pub line: Option<u64>,
    pub detail: String,
}

/// A reconciliation together with everything that was recovered on the way
#[derive(Debug, Clone)]
pub struct ReconReport {
    pub result: ReconciliationResult,
    pub old_load: LoadReport,
    pub new_load: LoadReport,
    pub old_index: IndexReport,
    pub new_index: IndexReport,
}

impl ReconReport {
    pub fn summary(&self) -> ReconSummary {
        let r = &self.result;
        ReconSummary {
            old_rows: r.old.len(),
            new_rows: r.new.len(),
            matched: r.matched_len(),
            partial: r.partial_len(),
            only_old: r.only_old_len(),
            only_new: r.only_new_len(),
            malformed_rows: self.old_load.malformed_rows.len() + self.new_load.malformed_rows.len(),
            duplicate_keys: self.old_index.duplicates.len() + self.new_index.duplicates.len(),
            key_errors: self.old_index.key_errors.len() + self.new_index.key_errors.len(),
            schema_mismatches: r.schema_mismatches.len(),
        }
    }

    /// All recovered problems: malformed rows, duplicate keys, key errors,
    /// then schema mismatches; old side before new within each kind.
    pub fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        for load in [&self.old_load, &self.new_load] {
            for m in &load.malformed_rows {
                issues.push(Issue {
                    kind: IssueKind::MalformedRow,
                    side: load.side,
                    line: Some(m.line),
                    detail: format!("{}: {}", m.reason, m.raw),
                });
            }
        }

        for index in [&self.old_index, &self.new_index] {
            for d in &index.duplicates {
                issues.push(Issue {
                    kind: IssueKind::DuplicateKey,
                    side: index.side,
                    line: Some(d.kept_line),
                    detail: format!("key '{}' also on line {} (replaced)", d.key, d.replaced_line),
                });
            }
        }

        for index in [&self.old_index, &self.new_index] {
            for e in &index.key_errors {
                issues.push(Issue {
                    kind: IssueKind::KeyError,
                    side: index.side,
                    line: Some(e.line),
                    detail: e.describe(),
                });
            }
        }

        for m in &self.result.schema_mismatches {
            issues.push(Issue {
                kind: IssueKind::SchemaMismatch,
                side: m.present_in,
                line: None,
                detail: format!("column '{}' only in {} input, not compared", m.column, m.present_in),
            });
        }

        issues
    }
}
