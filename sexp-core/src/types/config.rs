//! Marshaling configuration, stored in `sexp.toml`.

use std::fmt;
use std::path::{Path, PathBuf};

use fs_err as fs;
use serde::{Deserialize, Serialize};

use crate::types::Result;

/// Layer configuration.
///
/// Every section has a default, so an empty file is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The one-time access demand checked when a session opens.
    pub access: AccessPolicy,

    /// Matrix fill behavior.
    pub fill: FillPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPolicy {
    /// Whether the host may touch unmanaged native memory through this layer.
    pub unmanaged_code: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            unmanaged_code: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillPolicy {
    pub stride: FillStride,
}

/// Stride used by the fill algorithm when mapping `(row, column)` to a
/// source index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillStride {
    /// `column * column_count + row`. Compatible with existing behavior.
    /// Only matches true column-major order for square or single-column
    /// destinations.
    #[default]
    ColumnCount,
    /// `column * row_count + row`, true column-major order. Opt-in only.
    RowCount,
}

impl fmt::Display for FillStride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillStride::ColumnCount => write!(f, "column-count"),
            FillStride::RowCount => write!(f, "row-count"),
        }
    }
}

impl Config {
    /// Get the config file name.
    pub const fn config_filename() -> &'static str {
        "sexp.toml"
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    /// Save configuration into `directory`, returning the written path.
    pub fn save(&self, directory: impl AsRef<Path>) -> Result<PathBuf> {
        let config_path = directory.as_ref().join(Self::config_filename());
        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        log::info!("Configuration saved to {}", config_path.display());
        Ok(config_path)
    }

    /// Look for `sexp.toml` in `start` and its ancestors.
    ///
    /// Returns `None` when no config file exists anywhere up the tree.
    pub fn find(start: impl AsRef<Path>) -> Option<Result<Self>> {
        Self::search(start.as_ref(), None)
    }

    /// Like [`Config::find`], but stops after checking `ceiling`.
    pub fn find_within(start: impl AsRef<Path>, ceiling: impl AsRef<Path>) -> Option<Result<Self>> {
        Self::search(start.as_ref(), Some(ceiling.as_ref()))
    }

    fn search(start: &Path, ceiling: Option<&Path>) -> Option<Result<Self>> {
        for dir in start.ancestors() {
            let candidate = dir.join(Self::config_filename());
            log::trace!("Looking for config at {}", candidate.display());
            if candidate.is_file() {
                return Some(Self::load(&candidate));
            }
            if ceiling == Some(dir) {
                break;
            }
        }
        log::debug!("No config file found above {}", start.display());
        None
    }
}
