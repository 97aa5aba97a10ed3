//! Directory of CSV files, one per section

use super::{
    issue_cells, partial_header, schema_header, PartialLine, RenderScope, ReportFormat,
    ReportRenderer, ISSUE_HEADER,
};
use crate::error::Result;
use crate::model::RowRef;
use crate::report::ReconReport;
use std::fs;
use std::path::{Path, PathBuf};

pub const MATCHED_FILE: &str = "matched.csv";
pub const PARTIAL_FILE: &str = "partial.csv";
pub const ONLY_OLD_FILE: &str = "only_old.csv";
pub const ONLY_NEW_FILE: &str = "only_new.csv";
pub const ISSUES_FILE: &str = "issues.csv";

pub struct CsvDirRenderer {
    export_dir: PathBuf,
}

impl CsvDirRenderer {
    pub fn new(export_dir: &Path) -> Self {
        Self {
            export_dir: export_dir.to_path_buf(),
        }
    }
}

impl ReportRenderer for CsvDirRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }

    /// Writes `<export_dir>/<name>/` and returns that directory
    fn render(&self, report: &ReconReport, name: &str, scope: RenderScope) -> Result<PathBuf> {
        let dir = self.export_dir.join(name);
        fs::create_dir_all(&dir)?;
        let result = &report.result;

        if scope.includes_matches() {
            write_rows(
                &dir.join(MATCHED_FILE),
                &schema_header(result.old_dataset()),
                result.matched().map(|m| m.display()),
            )?;

            let mut header = partial_header(result);
            header.push("differing_columns".to_string());
            let mut writer = csv::Writer::from_path(dir.join(PARTIAL_FILE))?;
            writer.write_record(&header)?;
            for row in result.partial() {
                let line = PartialLine::new(&row, result.key_columns());
                let differing = row.differing_columns().collect::<Vec<_>>().join(";");
                let mut record: Vec<&str> = line.keys.iter().map(|k| k.unwrap_or("")).collect();
                for cell in &line.cells {
                    record.push(cell.old.unwrap_or(""));
                    record.push(cell.new.unwrap_or(""));
                }
                record.push(&differing);
                writer.write_record(&record)?;
            }
            writer.flush()?;
        }

        write_rows(
            &dir.join(ONLY_OLD_FILE),
            &schema_header(result.old_dataset()),
            result.only_old().map(|r| r.row),
        )?;
        write_rows(
            &dir.join(ONLY_NEW_FILE),
            &schema_header(result.new_dataset()),
            result.only_new().map(|r| r.row),
        )?;

        let mut writer = csv::Writer::from_path(dir.join(ISSUES_FILE))?;
        writer.write_record(ISSUE_HEADER)?;
        for issue in report.issues() {
            writer.write_record(issue_cells(&issue))?;
        }
        writer.flush()?;

        log::info!("Wrote {}", dir.display());
        Ok(dir)
    }
}

fn write_rows<'a>(
    path: &Path,
    header: &[String],
    rows: impl Iterator<Item = RowRef<'a>>,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row.values().map(|(_, v)| v.unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}
