//! Configuration Module
//!
//! Handles loading tool configuration from environment variables. CLI flags
//! override these values in `main`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::cache::CACHE_FILE_NAME;

/// Default report cache lifetime: one hour
pub const DEFAULT_CACHE_TTL_MS: u64 = 3_600_000;

/// Default report window length in days
pub const DEFAULT_WINDOW_DAYS: u32 = 14;

/// Tool configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the cache file
    pub cache_dir: PathBuf,
    /// Lifetime of cached reports in milliseconds
    pub cache_ttl_ms: u64,
    /// Report window length when `--from` is not given
    pub window_days: u32,
    /// Shell command line that prints the report
    pub report_command: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SPRINT_UPDATE_CACHE_DIR` - Cache directory (default: platform cache dir)
    /// - `SPRINT_UPDATE_CACHE_TTL_MS` - Report cache TTL in ms (default: 3600000)
    /// - `SPRINT_UPDATE_WINDOW_DAYS` - Report window in days (default: 14)
    /// - `SPRINT_UPDATE_REPORT_CMD` - Command printing the report (no default)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            cache_dir: lookup("SPRINT_UPDATE_CACHE_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            cache_ttl_ms: lookup("SPRINT_UPDATE_CACHE_TTL_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl_ms),
            window_days: lookup("SPRINT_UPDATE_WINDOW_DAYS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.window_days),
            report_command: lookup("SPRINT_UPDATE_REPORT_CMD").filter(|v| !v.trim().is_empty()),
        }
    }

    /// Path of the cache file.
    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE_NAME)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            window_days: DEFAULT_WINDOW_DAYS,
            report_command: None,
        }
    }
}

/// Platform cache directory, or `<tmp>/sprint-update` when none is known.
fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("com", "sprint-update", "sprint-update")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| env::temp_dir().join("sprint-update"))
}
