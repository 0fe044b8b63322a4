// Run settings
// Loaded from --config <path>, else ~/.config/exelsior/config.toml when present

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Default name of the report covering every comparison file.
pub const DEFAULT_COMBINED_REPORT: &str = "duplicate_names_result.xlsx";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory generated spreadsheets are written to
    pub output_dir: PathBuf,

    /// Also write cleaned_<stem>.xlsx for files with duplicates
    pub clean: bool,

    /// Combined report file name; empty disables it
    pub combined_report: String,

    /// Write duplicates_in_<stem>.xlsx per comparison file
    pub per_file_reports: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            clean: false,
            combined_report: DEFAULT_COMBINED_REPORT.to_string(),
            per_file_reports: true,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Read { path: PathBuf, message: String },
    /// TOML parse / deserialization error.
    Parse { path: PathBuf, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "cannot read config {}: {message}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "invalid config {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Settings {
    /// Default config file location
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("exelsior");
        config_dir.join("config.toml")
    }

    pub fn from_toml(s: &str) -> Result<Self, String> {
        toml::from_str(s).map_err(|e| e.to_string())
    }

    /// Load from an explicit path. A missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&contents).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Load from `path` if given, else from the default location if a file
    /// exists there, else defaults. Nothing is written to disk.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_from(p),
            None => {
                let default = Self::config_path();
                if default.is_file() {
                    Self::load_from(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Combined report name, or `None` when disabled.
    pub fn combined_report_name(&self) -> Option<&str> {
        let name = self.combined_report.trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}
