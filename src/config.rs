use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constraint::types::Dialect;
use crate::version::error::ConfigError;

// =============================================================================
// Logging
// =============================================================================

/// Environment variable holding the tracing filter directive
pub const LOG_ENV_VAR: &str = "VERSION_CANON_LOG";

/// Filter used when [`LOG_ENV_VAR`] is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "warn";

// =============================================================================
// Batch evaluation
// =============================================================================

/// Candidates used when a batch config does not list any
pub const DEFAULT_CANDIDATES: [&str; 11] = [
    "1.0.0", "1.2.3", "1.2.4", "1.3.0", "2.0.1", "2.3.1", "2.4.4", "2.5.2", "2.9.9", "3.0.0",
    "latest",
];

/// Batch configuration structure
///
/// ```json
/// {
///   "candidates": ["1.0.0", "2.0.0"],
///   "npm": ["^1.0.0", "2.x"],
///   "python": [">=1.0,<2.0"],
///   "nuget": ["[1.0,2.0)"]
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchConfig {
    pub candidates: Vec<String>,
    pub npm: Vec<String>,
    pub python: Vec<String>,
    pub nuget: Vec<String>,
}

impl BatchConfig {
    /// Read a batch config from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Configured candidates, or [`DEFAULT_CANDIDATES`] when none are given
    pub fn candidates(&self) -> Vec<String> {
        if self.candidates.is_empty() {
            DEFAULT_CANDIDATES.iter().map(|c| c.to_string()).collect()
        } else {
            self.candidates.clone()
        }
    }

    /// Ranges paired with their dialect, npm first, then python, then nuget
    pub fn ranges(&self) -> impl Iterator<Item = (Dialect, &str)> {
        tagged(Dialect::Npm, &self.npm)
            .chain(tagged(Dialect::Python, &self.python))
            .chain(tagged(Dialect::Nuget, &self.nuget))
    }
}

fn tagged(dialect: Dialect, ranges: &[String]) -> impl Iterator<Item = (Dialect, &str)> {
    ranges.iter().map(move |range| (dialect, range.as_str()))
}

/// Returns the path to the data directory for version-canon.
/// Uses $XDG_DATA_HOME/version-canon if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/version-canon,
/// or ./version-canon if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("version-canon.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("version-canon")
}
