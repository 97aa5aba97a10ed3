//! Command-line interface for tabrecon

use crate::config::parse_delimiter;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tabrecon")]
#[command(about = "Key-based reconciliation of two versions of a tabular dataset")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./tabrecon.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress spinners
    #[arg(long, global = true)]
    pub no_progress: bool,
}

impl Cli {
    /// Level for the logger: Debug with `--verbose`, Info otherwise
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile two files and export the four partitions
    Compare {
        /// Old (baseline) file
        old: PathBuf,

        /// New file
        new: PathBuf,

        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        export: ExportArgs,

        /// Print the summary as JSON
        #[arg(long)]
        json_summary: bool,

        /// Quiet output (machine-readable)
        #[arg(long)]
        quiet: bool,
    },

    /// Report only keys missing from one side
    Presence {
        /// Old (baseline) file
        old: PathBuf,

        /// New file
        new: PathBuf,

        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        export: ExportArgs,

        /// Quiet output (machine-readable)
        #[arg(long)]
        quiet: bool,
    },

    /// Compare every old/new folder pair under a root folder
    Batch {
        /// Folder whose subfolders each hold an old and a new folder
        root: PathBuf,

        #[command(flatten)]
        input: InputArgs,

        /// Report format: "xlsx", "csv" or "json"
        #[arg(long)]
        format: Option<String>,

        /// Export directory
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Write a default tabrecon.json
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// How to read the inputs
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Key column(s); order matters
    #[arg(long = "key", num_args = 1..)]
    pub key: Vec<String>,

    /// Field delimiter: one character or "tab"
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Input encoding label, e.g. "utf-8", "latin1", "windows-1252"
    #[arg(long)]
    pub encoding: Option<String>,

    /// Treat empty cells as empty text instead of missing
    #[arg(long)]
    pub keep_empty: bool,

    /// Trim whitespace around fields
    #[arg(long)]
    pub trim: bool,
}

/// Where and how to write the report
#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Report format: "xlsx", "csv" or "json"
    #[arg(long)]
    pub format: Option<String>,

    /// Export directory
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Export name (defaults to output-<unix seconds>)
    #[arg(long)]
    pub name: Option<String>,
}
