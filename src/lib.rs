//! # tabrecon
//!
//! Key-based reconciliation of two versions of a tabular dataset. Rows are
//! matched on a composite key of normalized values and split into four
//! partitions: matched, partially matched, only in old, only in new.

pub mod cli;
pub mod commands;
pub mod config;
pub mod discover;
pub mod error;
pub mod index;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod reconcile;
pub mod render;
pub mod report;

pub use error::{Result, SchemaError, TabreconError};
pub use index::{build_index, KeyIndex};
pub use loader::{load, load_path, LoadOptions};
pub use model::{Dataset, KeyColumns, Side};
pub use normalize::{normalize, CompositeKey, NormalizedValue};
pub use pipeline::{compare_paths, compare_readers, CompareSettings};
pub use reconcile::reconcile;
pub use report::{CellDiff, ReconReport, ReconciliationResult};

/// Current format version for tabrecon config files
pub const FORMAT_VERSION: &str = "1.0.0";

/// Default directory for exported reports
pub const DEFAULT_EXPORT_DIR: &str = "export";

/// Config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "tabrecon.json";
