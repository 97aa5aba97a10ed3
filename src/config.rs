//! JSON configuration file (`tabrecon.json`)

use crate::error::{Result, TabreconError};
use crate::loader::LoadOptions;
use crate::render::ReportFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persistent defaults; CLI flags override every field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub version: String,
    pub key_columns: Vec<String>,
    /// Single character, `\t` or `tab`
    pub delimiter: String,
    pub encoding: String,
    pub empty_as_missing: bool,
    pub trim: bool,
    pub export_dir: PathBuf,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            version: crate::FORMAT_VERSION.to_string(),
            key_columns: Vec::new(),
            delimiter: ",".to_string(),
            encoding: "utf-8".to_string(),
            empty_as_missing: true,
            trim: false,
            export_dir: PathBuf::from(crate::DEFAULT_EXPORT_DIR),
            format: "xlsx".to_string(),
            created: None,
        }
    }
}

impl ReconConfig {
    /// Read a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TabreconError::config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            TabreconError::config(format!("Invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Use the explicit path if given, else `tabrecon.json` in `dir` when it
    /// exists, else defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let candidate = dir.join(crate::CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::from_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Write a default config file. Existing files are kept unless forced.
    pub fn write_default(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            return Ok(false);
        }
        let config = Self {
            created: Some(chrono::Utc::now().to_rfc3339()),
            ..Self::default()
        };
        fs::write(path, serde_json::to_string_pretty(&config)?)?;
        log::info!("Wrote default config to {}", path.display());
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        parse_delimiter(&self.delimiter).map_err(TabreconError::config)?;
        ReportFormat::parse(&self.format).map_err(TabreconError::config)?;
        Ok(())
    }

    /// Loader options with any overrides applied
    pub fn load_options(&self) -> Result<LoadOptions> {
        Ok(LoadOptions {
            delimiter: parse_delimiter(&self.delimiter).map_err(TabreconError::config)?,
            encoding: self.encoding.clone(),
            empty_as_missing: self.empty_as_missing,
            trim: self.trim,
        })
    }
}

/// Parse a delimiter given as a single ASCII character, `\t` or `tab`
pub fn parse_delimiter(s: &str) -> std::result::Result<u8, String> {
    match s {
        "\\t" | "\t" | "tab" | "TAB" => Ok(b'\t'),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => Ok(c as u8),
                _ => Err(format!(
                    "Invalid delimiter: '{}'. Use a single ASCII character or 'tab'",
                    s
                )),
            }
        }
    }
}
