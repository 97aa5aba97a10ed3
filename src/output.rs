//! Console output formatting

use crate::discover::SkippedFolder;
use crate::error::Result;
use crate::report::{Issue, ReconReport, ReconSummary};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// How many issues the console summary lists before truncating
const ISSUE_SAMPLE: usize = 5;

/// Outcome of one pair in a batch run
#[derive(Debug)]
pub struct BatchOutcome {
    pub name: String,
    pub result: std::result::Result<(ReconSummary, PathBuf), String>,
}

/// Pretty printer for tabrecon output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print the summary of a full comparison
    pub fn print_summary(report: &ReconReport, written: Option<&Path>, quiet: bool) {
        let summary = report.summary();
        if quiet {
            // Machine-readable output
            println!("matched={}", summary.matched);
            println!("partial={}", summary.partial);
            println!("only_old={}", summary.only_old);
            println!("only_new={}", summary.only_new);
            println!("issues={}", summary.issue_count());
            return;
        }

        let result = &report.result;
        println!(
            "📊 {} → {}",
            result.old_dataset().label(),
            result.new_dataset().label()
        );
        println!("├─ Key: [{}]", result.key_columns());
        println!(
            "├─ Rows: {} old, {} new",
            summary.old_rows, summary.new_rows
        );
        println!("├─ ✅ Matched: {}", summary.matched);
        if summary.partial > 0 {
            println!("├─ ❌ Partially matched: {}", summary.partial);
            if let Some(first) = result.partial().next() {
                let columns: Vec<&str> = first.differing_columns().collect();
                println!(
                    "│  └─ e.g. key '{}' differs in: {}",
                    first.key,
                    columns.join(", ")
                );
            }
        } else {
            println!("├─ ✅ Partially matched: 0");
        }
        println!("├─ Only in old: {}", summary.only_old);
        println!("├─ Only in new: {}", summary.only_new);
        Self::print_issue_block(&summary, &report.issues());
        match written {
            Some(path) => println!("└─ Report: {}", path.display()),
            None => println!("└─ Report: not written"),
        }
    }

    /// Print only the keys missing from either side
    pub fn print_presence(report: &ReconReport, written: Option<&Path>, quiet: bool) {
        let result = &report.result;
        if quiet {
            println!("only_old={}", result.only_old_len());
            println!("only_new={}", result.only_new_len());
            return;
        }

        println!(
            "🔍 Presence: {} → {}",
            result.old_dataset().label(),
            result.new_dataset().label()
        );
        println!("├─ New fields: {}", result.only_new_len());
        for row in result.only_new().take(ISSUE_SAMPLE) {
            println!("│  ├─ {}", row.key);
        }
        if result.only_new_len() > ISSUE_SAMPLE {
            println!("│  └─ ... and {} more", result.only_new_len() - ISSUE_SAMPLE);
        }
        println!("├─ Missing fields: {}", result.only_old_len());
        for row in result.only_old().take(ISSUE_SAMPLE) {
            println!("│  ├─ {}", row.key);
        }
        if result.only_old_len() > ISSUE_SAMPLE {
            println!("│  └─ ... and {} more", result.only_old_len() - ISSUE_SAMPLE);
        }
        if let Some(path) = written {
            println!("└─ Report: {}", path.display());
        } else {
            println!("└─ Report: not written");
        }
    }

    /// Print a batch run
    pub fn print_batch(outcomes: &[BatchOutcome], skipped: &[SkippedFolder]) {
        println!("📁 Batch: {} pair(s)", outcomes.len());
        for outcome in outcomes {
            match &outcome.result {
                Ok((summary, path)) => println!(
                    "├─ ✅ {}: {} matched, {} partial, {} only old, {} only new → {}",
                    outcome.name,
                    summary.matched,
                    summary.partial,
                    summary.only_old,
                    summary.only_new,
                    path.display()
                ),
                Err(message) => println!("├─ ❌ {}: {}", outcome.name, message),
            }
        }
        for folder in skipped {
            println!("├─ ⏭ {}: {}", folder.name, folder.reason);
        }
        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        println!("└─ {} succeeded, {} failed", outcomes.len() - failed, failed);
    }

    fn print_issue_block(summary: &ReconSummary, issues: &[Issue]) {
        if issues.is_empty() {
            println!("├─ ✅ Issues: none");
            return;
        }
        println!("├─ ⚠️  Issues: {}", issues.len());
        println!(
            "│  ├─ Malformed rows: {}, duplicate keys: {}, key errors: {}, schema mismatches: {}",
            summary.malformed_rows, summary.duplicate_keys, summary.key_errors, summary.schema_mismatches
        );
        for (i, issue) in issues.iter().take(ISSUE_SAMPLE).enumerate() {
            let is_last = i == issues.len().min(ISSUE_SAMPLE) - 1 && issues.len() <= ISSUE_SAMPLE;
            let prefix = if is_last { "└─" } else { "├─" };
            let line = issue.line.map(|l| format!(" line {}", l)).unwrap_or_default();
            println!(
                "│  {} [{}] {}{}: {}",
                prefix,
                issue.kind.as_str(),
                issue.side,
                line,
                issue.detail
            );
        }
        if issues.len() > ISSUE_SAMPLE {
            println!("│  └─ ... and {} more", issues.len() - ISSUE_SAMPLE);
        }
    }
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    old_input: &'a str,
    new_input: &'a str,
    report: Option<&'a Path>,
    summary: ReconSummary,
    issues: Vec<Issue>,
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Summary counts plus every issue
    pub fn format_summary(report: &ReconReport, written: Option<&Path>) -> Result<String> {
        let result = &report.result;
        Self::format(&JsonSummary {
            old_input: result.old_dataset().label(),
            new_input: result.new_dataset().label(),
            report: written,
            summary: report.summary(),
            issues: report.issues(),
        })
    }
}
