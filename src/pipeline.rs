//! Load → index → reconcile for one pair of inputs

use crate::error::Result;
use crate::index::{build_index, IndexReport, KeyIndex};
use crate::loader::{load, load_path, LoadOptions, LoadReport};
use crate::model::{Dataset, KeyColumns, Side};
use crate::progress::ProgressReporter;
use crate::reconcile::reconcile;
use crate::report::ReconReport;
use std::io::Read;
use std::path::Path;

/// Everything needed to compare two inputs
#[derive(Debug, Clone)]
pub struct CompareSettings {
    pub key_columns: KeyColumns,
    pub load: LoadOptions,
}

impl CompareSettings {
    pub fn new(key_columns: KeyColumns) -> Self {
        Self {
            key_columns,
            load: LoadOptions::default(),
        }
    }
}

/// Compare two files. Both sides are loaded and indexed in parallel.
pub fn compare_paths(
    old: &Path,
    new: &Path,
    settings: &CompareSettings,
    progress: &mut ProgressReporter,
) -> Result<ReconReport> {
    log::debug!(
        "Comparing {} -> {} on key [{}]",
        old.display(),
        new.display(),
        settings.key_columns
    );

    let (old_side, new_side) = {
        let reporter: &ProgressReporter = progress;
        rayon::join(
            || {
                let side = load_path(old, Side::Old, &settings.key_columns, &settings.load)
                    .map(|loaded| index_loaded(loaded, &settings.key_columns));
                reporter.finish_load(true, &load_message(old, &side));
                side
            },
            || {
                let side = load_path(new, Side::New, &settings.key_columns, &settings.load)
                    .map(|loaded| index_loaded(loaded, &settings.key_columns));
                reporter.finish_load(false, &load_message(new, &side));
                side
            },
        )
    };

    Ok(finish(old_side?, new_side?, progress))
}

/// Compare two in-memory sources
pub fn compare_readers<O: Read, N: Read>(
    old: O,
    old_label: &str,
    new: N,
    new_label: &str,
    settings: &CompareSettings,
) -> Result<ReconReport> {
    let old_side = load(old, old_label, Side::Old, &settings.key_columns, &settings.load)
        .map(|loaded| index_loaded(loaded, &settings.key_columns))?;
    let new_side = load(new, new_label, Side::New, &settings.key_columns, &settings.load)
        .map(|loaded| index_loaded(loaded, &settings.key_columns))?;
    Ok(finish(old_side, new_side, &mut ProgressReporter::new_minimal()))
}

struct IndexedSide {
    index: KeyIndex,
    load: LoadReport,
    index_report: IndexReport,
}

fn index_loaded(loaded: (Dataset, LoadReport), key_columns: &KeyColumns) -> IndexedSide {
    let (dataset, load) = loaded;
    let (index, index_report) = build_index(dataset, key_columns);
    IndexedSide {
        index,
        load,
        index_report,
    }
}

fn finish(old: IndexedSide, new: IndexedSide, progress: &mut ProgressReporter) -> ReconReport {
    progress.start_reconcile();
    let result = reconcile(old.index, new.index);
    progress.finish_reconcile(&format!(
        "Reconciled: {} matched, {} partial, {} only old, {} only new",
        result.matched_len(),
        result.partial_len(),
        result.only_old_len(),
        result.only_new_len()
    ));

    ReconReport {
        result,
        old_load: old.load,
        new_load: new.load,
        old_index: old.index_report,
        new_index: new.index_report,
    }
}

fn load_message(path: &Path, side: &Result<IndexedSide>) -> String {
    match side {
        Ok(s) => format!(
            "Loaded {}: {} rows, {} keys",
            path.display(),
            s.load.rows_loaded,
            s.index.len()
        ),
        Err(_) => format!("Failed to load {}", path.display()),
    }
}
