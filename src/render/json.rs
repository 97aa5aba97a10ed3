//! JSON document renderer

use super::{RenderScope, ReportFormat, ReportRenderer};
use crate::error::Result;
use crate::model::{KeyColumns, RowRef};
use crate::report::{Issue, ReconReport, ReconSummary, SchemaMismatch};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub struct JsonRenderer {
    export_dir: PathBuf,
}

impl JsonRenderer {
    pub fn new(export_dir: &Path) -> Self {
        Self {
            export_dir: export_dir.to_path_buf(),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    old_input: &'a str,
    new_input: &'a str,
    key_columns: &'a KeyColumns,
    shared_columns: Vec<&'a str>,
    schema_mismatches: &'a [SchemaMismatch],
    summary: ReconSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    matched: Option<Vec<JsonRow<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partial: Option<Vec<JsonPartial<'a>>>,
    only_old: Vec<JsonRow<'a>>,
    only_new: Vec<JsonRow<'a>>,
    issues: Vec<Issue>,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    key: &'a str,
    line: u64,
    values: IndexMap<&'a str, Option<&'a str>>,
}

impl<'a> JsonRow<'a> {
    fn new(key: &'a str, row: RowRef<'a>) -> Self {
        Self {
            key,
            line: row.line(),
            values: row.values().collect(),
        }
    }
}

#[derive(Serialize)]
struct JsonPartial<'a> {
    key: &'a str,
    old_line: u64,
    new_line: u64,
    cells: Vec<JsonCell<'a>>,
}

#[derive(Serialize)]
struct JsonCell<'a> {
    column: &'a str,
    old: Option<&'a str>,
    new: Option<&'a str>,
    differs: bool,
}

impl ReportRenderer for JsonRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }

    fn render(&self, report: &ReconReport, name: &str, scope: RenderScope) -> Result<PathBuf> {
        fs::create_dir_all(&self.export_dir)?;
        let path = self.export_dir.join(format!("{}.json", name));
        let result = &report.result;

        let (matched, partial) = if scope.includes_matches() {
            let matched = result
                .matched()
                .map(|m| JsonRow::new(m.key.as_str(), m.display()))
                .collect();
            let partial = result
                .partial()
                .map(|p| JsonPartial {
                    key: p.key.as_str(),
                    old_line: p.old.line(),
                    new_line: p.new.line(),
                    cells: p
                        .cell_diffs()
                        .map(|c| JsonCell {
                            column: c.column,
                            old: c.old,
                            new: c.new,
                            differs: c.differs,
                        })
                        .collect(),
                })
                .collect();
            (Some(matched), Some(partial))
        } else {
            (None, None)
        };

        let document = JsonReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            old_input: result.old_dataset().label(),
            new_input: result.new_dataset().label(),
            key_columns: result.key_columns(),
            shared_columns: result.shared_columns().iter().map(|c| c.name.as_str()).collect(),
            schema_mismatches: result.schema_mismatches(),
            summary: report.summary(),
            matched,
            partial,
            only_old: result
                .only_old()
                .map(|r| JsonRow::new(r.key.as_str(), r.row))
                .collect(),
            only_new: result
                .only_new()
                .map(|r| JsonRow::new(r.key.as_str(), r.row))
                .collect(),
            issues: report.issues(),
        };

        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, &document)?;
        log::info!("Wrote {}", path.display());
        Ok(path)
    }
}
