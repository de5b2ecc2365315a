//! Application configuration.
//!
//! An optional JSON file can override the scan defaults:
//!
//! ```json
//! {
//!     "similarity_threshold": 8,
//!     "min_file_size": 4096,
//!     "extra_skip_dirs": ["node_modules", "target"]
//! }
//! ```
//!
//! The file lives at `<config dir>/dupescan/config.json` (per-platform via
//! the `directories` crate). A missing file yields the defaults; a malformed
//! file logs a warning and yields the defaults.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default BK-tree query radius for similarity grouping.
pub const DEFAULT_SIMILARITY_THRESHOLD: u32 = 10;

/// Default minimum file size for exact-duplicate mode, in bytes.
pub const DEFAULT_MIN_FILE_SIZE: u64 = 1024;

/// Scan configuration with serde-backed persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Maximum Hamming distance (or mean per-frame distance) for two files
    /// to land in the same similarity group.
    pub similarity_threshold: u32,

    /// Files smaller than this are not considered in exact-duplicate mode.
    pub min_file_size: u64,

    /// Directory names skipped in addition to the built-in set.
    pub extra_skip_dirs: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            min_file_size: DEFAULT_MIN_FILE_SIZE,
            extra_skip_dirs: Vec::new(),
        }
    }
}

impl Config {
    /// Get the path to the configuration file.
    ///
    /// Returns `None` if the platform config directory cannot be determined.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupescan", "dupescan")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the default location, falling back to
    /// defaults when the file is absent or unreadable.
    #[must_use]
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::default(),
        }
    }

    /// Load configuration from a specific path, falling back to defaults.
    #[must_use]
    pub fn load_from(path: &std::path::Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::debug!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Invalid config file {}: {}. Using defaults.",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!(
                    "Failed to read config file {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}
