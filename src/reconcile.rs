//! Four-way reconciliation of two key indexes

use crate::index::KeyIndex;
use crate::model::{Row, Schema, Side};
use crate::normalize::CompositeKey;
use crate::report::{
    PairEntry, PartialEntry, ReconciliationResult, SchemaMismatch, SharedColumn, SingleEntry,
};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::btree_map;
use std::iter::Peekable;

/// Classify every key of both indexes as matched, partial, only-old or only-new.
///
/// Cells are compared by normalized value over the shared columns only, so
/// column order and columns present on one side never affect the outcome.
pub fn reconcile(old: KeyIndex, new: KeyIndex) -> ReconciliationResult {
    let (old_dataset, key_columns, old_entries) = old.into_parts();
    let (new_dataset, new_key_columns, new_entries) = new.into_parts();

    let (shared_columns, schema_mismatches) = compare_schemas(
        old_dataset.schema(),
        new_dataset.schema(),
        |c| key_columns.contains(c) || new_key_columns.contains(c),
    );
    for mismatch in &schema_mismatches {
        log::info!(
            "Column '{}' only present in {} input; excluded from comparison",
            mismatch.column,
            mismatch.present_in
        );
    }

    let mut common: Vec<PairEntry> = Vec::new();
    let mut only_old = Vec::new();
    let mut only_new = Vec::new();

    for step in MergeKeys::new(old_entries.iter(), new_entries.iter()) {
        match step {
            Merged::Both(key, o, n) => common.push(PairEntry {
                key: key.clone(),
                old: o,
                new: n,
            }),
            Merged::OldOnly(key, row) => only_old.push(SingleEntry {
                key: key.clone(),
                row,
            }),
            Merged::NewOnly(key, row) => only_new.push(SingleEntry {
                key: key.clone(),
                row,
            }),
        }
    }

    // Read-only comparison; collect keeps key order.
    let masks: Vec<Vec<bool>> = common
        .par_iter()
        .map(|pair| {
            diff_mask(
                &old_dataset.rows()[pair.old],
                &new_dataset.rows()[pair.new],
                &shared_columns,
            )
        })
        .collect();

    let mut matched = Vec::new();
    let mut partial = Vec::new();
    for (pair, differs) in common.into_iter().zip(masks) {
        if differs.iter().any(|&d| d) {
            partial.push(PartialEntry {
                key: pair.key,
                old: pair.old,
                new: pair.new,
                differs,
            });
        } else {
            matched.push(pair);
        }
    }

    log::info!(
        "Reconciled: {} matched, {} partial, {} only in old, {} only in new",
        matched.len(),
        partial.len(),
        only_old.len(),
        only_new.len()
    );

    ReconciliationResult {
        old: old_dataset,
        new: new_dataset,
        key_columns,
        shared_columns,
        schema_mismatches,
        matched,
        partial,
        only_old,
        only_new,
    }
}

/// Shared columns in old-schema order, minus key columns, and the columns
/// that only one side declares.
pub(crate) fn compare_schemas(
    old: &Schema,
    new: &Schema,
    is_key: impl Fn(&str) -> bool,
) -> (Vec<SharedColumn>, Vec<SchemaMismatch>) {
    let mut shared = Vec::new();
    let mut mismatches = Vec::new();

    for (old_pos, name) in old.iter().enumerate() {
        match new.position(name) {
            Some(new_pos) => {
                if !is_key(name) {
                    shared.push(SharedColumn {
                        name: name.to_string(),
                        old_pos,
                        new_pos,
                    });
                }
            }
            None => mismatches.push(SchemaMismatch {
                column: name.to_string(),
                present_in: Side::Old,
            }),
        }
    }

    for name in new.iter() {
        if !old.contains(name) {
            mismatches.push(SchemaMismatch {
                column: name.to_string(),
                present_in: Side::New,
            });
        }
    }

    (shared, mismatches)
}

fn diff_mask(old: &Row, new: &Row, shared: &[SharedColumn]) -> Vec<bool> {
    shared
        .iter()
        .map(|column| {
            let o = old.field_at(column.old_pos).map(|f| f.normalized());
            let n = new.field_at(column.new_pos).map(|f| f.normalized());
            o != n
        })
        .collect()
}

enum Merged<'a> {
    Both(&'a CompositeKey, usize, usize),
    OldOnly(&'a CompositeKey, usize),
    NewOnly(&'a CompositeKey, usize),
}

/// Sorted merge over two ascending key maps
struct MergeKeys<'a> {
    old: Peekable<btree_map::Iter<'a, CompositeKey, usize>>,
    new: Peekable<btree_map::Iter<'a, CompositeKey, usize>>,
}

impl<'a> MergeKeys<'a> {
    fn new(
        old: btree_map::Iter<'a, CompositeKey, usize>,
        new: btree_map::Iter<'a, CompositeKey, usize>,
    ) -> Self {
        Self {
            old: old.peekable(),
            new: new.peekable(),
        }
    }
}

impl<'a> Iterator for MergeKeys<'a> {
    type Item = Merged<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let order = match (self.old.peek(), self.new.peek()) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((o, _)), Some((n, _))) => o.cmp(n),
        };
        match order {
            Ordering::Less => {
                let (key, &row) = self.old.next()?;
                Some(Merged::OldOnly(key, row))
            }
            Ordering::Greater => {
                let (key, &row) = self.new.next()?;
                Some(Merged::NewOnly(key, row))
            }
            Ordering::Equal => {
                let (key, &o) = self.old.next()?;
                let (_, &n) = self.new.next()?;
                Some(Merged::Both(key, o, n))
            }
        }
    }
}
