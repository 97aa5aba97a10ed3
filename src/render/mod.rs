//! Report renderers
//!
//! A renderer turns a [`ReconReport`] into a file. The layout decisions shared
//! by every tabular target (section names, column headers, partial-row
//! interleaving) live here so the targets agree with each other.

pub mod csv_dir;
pub mod json;
pub mod xlsx;

use crate::error::Result;
use crate::model::{Dataset, KeyColumns};
use crate::report::{CellDiff, Issue, PartialRow, ReconReport, ReconciliationResult};
use std::path::{Path, PathBuf};

pub use csv_dir::CsvDirRenderer;
pub use json::JsonRenderer;
pub use xlsx::XlsxRenderer;

pub const MATCHED_SECTION: &str = "perfectly_matched";
pub const PARTIAL_SECTION: &str = "partially_matched";
pub const ONLY_OLD_SECTION: &str = "only_in_old";
pub const ONLY_NEW_SECTION: &str = "only_in_new";
pub const ISSUES_SECTION: &str = "issues";

/// Output file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Xlsx,
    Csv,
    Json,
}

impl ReportFormat {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid report format: {}. Use 'xlsx', 'csv' or 'json'", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Which sections to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderScope {
    /// All four partitions plus issues
    Full,
    /// Only keys missing from one side, plus issues
    PresenceOnly,
}

impl RenderScope {
    pub fn includes_matches(&self) -> bool {
        matches!(self, Self::Full)
    }
}

pub trait ReportRenderer {
    fn format(&self) -> ReportFormat;

    /// Write the report under `name` and return the path written
    fn render(&self, report: &ReconReport, name: &str, scope: RenderScope) -> Result<PathBuf>;
}

pub fn renderer_for(format: ReportFormat, export_dir: &Path) -> Box<dyn ReportRenderer> {
    match format {
        ReportFormat::Xlsx => Box::new(XlsxRenderer::new(export_dir)),
        ReportFormat::Csv => Box::new(CsvDirRenderer::new(export_dir)),
        ReportFormat::Json => Box::new(JsonRenderer::new(export_dir)),
    }
}

/// `output-<unix seconds>`, used when no export name is given
pub fn default_export_name() -> String {
    format!("output-{}", chrono::Utc::now().timestamp())
}

pub(crate) fn schema_header(dataset: &Dataset) -> Vec<String> {
    dataset.schema().iter().map(str::to_string).collect()
}

/// Key columns, then `<column>_old` / `<column>_new` for each shared column
pub(crate) fn partial_header(result: &ReconciliationResult) -> Vec<String> {
    let mut header: Vec<String> = result.key_columns().iter().map(str::to_string).collect();
    for column in result.shared_columns() {
        header.push(format!("{}_old", column.name));
        header.push(format!("{}_new", column.name));
    }
    header
}

/// One output line of the partial section
pub(crate) struct PartialLine<'a> {
    pub keys: Vec<Option<&'a str>>,
    pub cells: Vec<CellDiff<'a>>,
}

impl<'a> PartialLine<'a> {
    pub fn new(row: &PartialRow<'a>, key_columns: &KeyColumns) -> Self {
        Self {
            keys: key_columns.iter().map(|c| row.old.raw(c)).collect(),
            cells: row.cell_diffs().collect(),
        }
    }
}

pub(crate) const ISSUE_HEADER: [&str; 4] = ["kind", "side", "line", "detail"];

pub(crate) fn issue_cells(issue: &Issue) -> [String; 4] {
    [
        issue.kind.as_str().to_string(),
        issue.side.as_str().to_string(),
        issue.line.map(|l| l.to_string()).unwrap_or_default(),
        issue.detail.clone(),
    ]
}
