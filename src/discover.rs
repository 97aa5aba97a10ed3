//! Batch discovery: find old/new input pairs under a folder tree
//!
//! Layout:
//!
//! ```text
//! ROOT/
//!   Pricing/
//!     Pricing Old/   first file by name is the old input
//!     Pricing New/   first file by name is the new input
//! ```
//!
//! A subfolder counts as the old (new) side when the last whitespace-separated
//! word of its name is `old` (`new`), ignoring case.

use crate::error::{Result, TabreconError};
use crate::model::Side;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// One folder with both an old and a new input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPair {
    pub name: String,
    pub old: PathBuf,
    pub new: PathBuf,
}

impl BatchPair {
    /// `<folder>-Compared`
    pub fn export_name(&self) -> String {
        format!("{}-Compared", self.name)
    }
}

/// A folder that looked like a pair but could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFolder {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchPlan {
    pub pairs: Vec<BatchPair>,
    pub skipped: Vec<SkippedFolder>,
}

/// Which side a folder name denotes, if any
pub fn side_of_folder(name: &str) -> Option<Side> {
    let last = name.split_whitespace().last()?;
    if last.eq_ignore_ascii_case("old") {
        Some(Side::Old)
    } else if last.eq_ignore_ascii_case("new") {
        Some(Side::New)
    } else {
        None
    }
}

/// Scan the direct subfolders of `root` for old/new pairs, in name order.
/// Folders with neither an old nor a new subfolder are ignored.
pub fn discover_pairs(root: &Path) -> Result<BatchPlan> {
    if !root.is_dir() {
        return Err(TabreconError::invalid_input(format!(
            "Batch root is not a directory: {}",
            root.display()
        )));
    }

    let mut plan = BatchPlan::default();
    for entry in children(root) {
        let entry = entry?;
        if !entry.file_type().is_dir() || is_hidden(&entry) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();

        let mut old_dir = None;
        let mut new_dir = None;
        for sub in children(entry.path()) {
            let sub = sub?;
            if !sub.file_type().is_dir() {
                continue;
            }
            let slot = match side_of_folder(&sub.file_name().to_string_lossy()) {
                Some(Side::Old) => &mut old_dir,
                Some(Side::New) => &mut new_dir,
                None => continue,
            };
            // First match by name wins
            if slot.is_none() {
                *slot = Some(sub.into_path());
            }
        }

        match (old_dir, new_dir) {
            (None, None) => log::debug!("Ignoring {}: no old/new subfolders", name),
            (Some(old_dir), Some(new_dir)) => {
                match (first_file(&old_dir)?, first_file(&new_dir)?) {
                    (Some(old), Some(new)) => plan.pairs.push(BatchPair { name, old, new }),
                    (old, _) => {
                        let empty = if old.is_none() { old_dir } else { new_dir };
                        plan.skipped.push(SkippedFolder {
                            name,
                            reason: format!("no input file in {}", empty.display()),
                        });
                    }
                }
            }
            (old_dir, _) => {
                let missing = if old_dir.is_none() { Side::Old } else { Side::New };
                plan.skipped.push(SkippedFolder {
                    name,
                    reason: format!("no '{}' subfolder", missing),
                });
            }
        }
    }

    log::info!(
        "Found {} pair(s) under {} ({} skipped)",
        plan.pairs.len(),
        root.display(),
        plan.skipped.len()
    );
    Ok(plan)
}

fn children(dir: &Path) -> walkdir::IntoIter {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn first_file(dir: &Path) -> Result<Option<PathBuf>> {
    for entry in children(dir) {
        let entry = entry?;
        if entry.file_type().is_file() && !is_hidden(&entry) {
            return Ok(Some(entry.into_path()));
        }
    }
    Ok(None)
}
