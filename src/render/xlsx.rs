//! Excel workbook renderer
//!
//! One sheet per section. In the partial sheet, differing cells are painted
//! red (old value) and blue (new value) with white text.

use super::{
    issue_cells, partial_header, schema_header, PartialLine, RenderScope, ReportFormat,
    ReportRenderer, ISSUES_SECTION, ISSUE_HEADER, MATCHED_SECTION, ONLY_NEW_SECTION,
    ONLY_OLD_SECTION, PARTIAL_SECTION,
};
use crate::error::{Result, TabreconError};
use crate::model::RowRef;
use crate::report::ReconReport;
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};
use std::fs;
use std::path::{Path, PathBuf};

/// Excel's sheet limits
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;
const MAX_CELL_CHARS: usize = 32_767;

pub struct XlsxRenderer {
    export_dir: PathBuf,
}

struct Formats {
    header: Format,
    old_diff: Format,
    new_diff: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            old_diff: Format::new()
                .set_background_color(Color::Red)
                .set_font_color(Color::White),
            new_diff: Format::new()
                .set_background_color(Color::Blue)
                .set_font_color(Color::White),
        }
    }
}

impl XlsxRenderer {
    pub fn new(export_dir: &Path) -> Self {
        Self {
            export_dir: export_dir.to_path_buf(),
        }
    }
}

impl ReportRenderer for XlsxRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Xlsx
    }

    fn render(&self, report: &ReconReport, name: &str, scope: RenderScope) -> Result<PathBuf> {
        fs::create_dir_all(&self.export_dir)?;
        let path = self.export_dir.join(format!("{}.xlsx", name));
        let result = &report.result;
        let formats = Formats::new();
        let mut workbook = Workbook::new();

        if scope.includes_matches() {
            let header = schema_header(result.old_dataset());
            let sheet = add_sheet(&mut workbook, MATCHED_SECTION, &header, &formats)?;
            write_rows(sheet, result.matched().map(|m| m.display()), result.matched_len())?;

            let header = partial_header(result);
            let sheet = add_sheet(&mut workbook, PARTIAL_SECTION, &header, &formats)?;
            check_rows(result.partial_len())?;
            for (i, row) in result.partial().enumerate() {
                let line = PartialLine::new(&row, result.key_columns());
                let r = (i + 1) as u32;
                let mut col: u16 = 0;
                for key in &line.keys {
                    write_cell(sheet, r, col, *key, None)?;
                    col += 1;
                }
                for cell in &line.cells {
                    let (old_fmt, new_fmt) = if cell.differs {
                        (Some(&formats.old_diff), Some(&formats.new_diff))
                    } else {
                        (None, None)
                    };
                    write_cell(sheet, r, col, cell.old, old_fmt)?;
                    write_cell(sheet, r, col + 1, cell.new, new_fmt)?;
                    col += 2;
                }
            }
        }

        let header = schema_header(result.old_dataset());
        let sheet = add_sheet(&mut workbook, ONLY_OLD_SECTION, &header, &formats)?;
        write_rows(sheet, result.only_old().map(|r| r.row), result.only_old_len())?;

        let header = schema_header(result.new_dataset());
        let sheet = add_sheet(&mut workbook, ONLY_NEW_SECTION, &header, &formats)?;
        write_rows(sheet, result.only_new().map(|r| r.row), result.only_new_len())?;

        let issues = report.issues();
        let header: Vec<String> = ISSUE_HEADER.iter().map(|s| s.to_string()).collect();
        let sheet = add_sheet(&mut workbook, ISSUES_SECTION, &header, &formats)?;
        check_rows(issues.len())?;
        for (i, issue) in issues.iter().enumerate() {
            for (col, value) in issue_cells(issue).iter().enumerate() {
                write_cell(sheet, (i + 1) as u32, col as u16, Some(value), None)?;
            }
        }

        workbook.save(&path)?;
        log::info!("Wrote {}", path.display());
        Ok(path)
    }
}

fn add_sheet<'w>(
    workbook: &'w mut Workbook,
    name: &str,
    header: &[String],
    formats: &Formats,
) -> Result<&'w mut Worksheet> {
    if header.len() > MAX_COLS {
        return Err(TabreconError::render(format!(
            "Sheet '{}' needs {} columns; Excel allows {}",
            name,
            header.len(),
            MAX_COLS
        )));
    }
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name)?;
    for (col, title) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, title, &formats.header)?;
    }
    worksheet.set_freeze_panes(1, 0)?;
    Ok(worksheet)
}

fn write_rows<'a>(
    sheet: &mut Worksheet,
    rows: impl Iterator<Item = RowRef<'a>>,
    count: usize,
) -> Result<()> {
    check_rows(count)?;
    for (i, row) in rows.enumerate() {
        for (col, (_, value)) in row.values().enumerate() {
            write_cell(sheet, (i + 1) as u32, col as u16, value, None)?;
        }
    }
    Ok(())
}

fn check_rows(count: usize) -> Result<()> {
    // Header takes the first row
    if count + 1 > MAX_ROWS {
        return Err(TabreconError::render(format!(
            "{} rows do not fit in one Excel sheet; use the csv format",
            count
        )));
    }
    Ok(())
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<&str>,
    format: Option<&Format>,
) -> Result<()> {
    if let Some(v) = value {
        let chars = v.chars().count();
        if chars > MAX_CELL_CHARS {
            return Err(TabreconError::render(format!(
                "Cell {} in sheet '{}' holds {} characters; Excel allows {}. Use the csv format",
                cell_name(row, col),
                sheet.name(),
                chars,
                MAX_CELL_CHARS
            )));
        }
    }
    match (value, format) {
        (Some(v), Some(f)) => {
            sheet.write_string_with_format(row, col, v, f)?;
        }
        (Some(v), None) => {
            sheet.write_string(row, col, v)?;
        }
        (None, Some(f)) => {
            sheet.write_blank(row, col, f)?;
        }
        (None, None) => {}
    }
    Ok(())
}

/// A1-style reference for zero-based coordinates
fn cell_name(row: u32, col: u16) -> String {
    let mut letters = Vec::new();
    let mut n = col as u32 + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    format!("{}{}", String::from_utf8_lossy(&letters), row + 1)
}
