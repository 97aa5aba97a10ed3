//! Error types for tabrecon operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TabreconError>;

/// Fatal problems with an input's header. Reconciliation cannot proceed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Key column '{column}' not found in {input}")]
    MissingKeyColumn { column: String, input: String },

    #[error("Column '{column}' appears more than once in the header of {input}")]
    DuplicateColumn { column: String, input: String },

    #[error("No header row found in {input}")]
    EmptyInput { input: String },
}

#[derive(Error, Debug)]
pub enum TabreconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Batch finished with {failed} of {total} comparisons failing")]
    Batch { failed: usize, total: usize },

    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl TabreconError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn missing_key_column(column: impl Into<String>, input: impl Into<String>) -> Self {
        Self::Schema(SchemaError::MissingKeyColumn {
            column: column.into(),
            input: input.into(),
        })
    }

    /// Returns the schema error if this is one
    pub fn as_schema_error(&self) -> Option<&SchemaError> {
        match self {
            Self::Schema(e) => Some(e),
            _ => None,
        }
    }
}
