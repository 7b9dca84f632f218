//! Configuration and results paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/case-harness/` and `~/.local/share/case-harness/`
//! - macOS: `~/Library/Application Support/case-harness/`
//! - Windows: `%APPDATA%\case-harness\`

use std::io;
use std::path::{Path, PathBuf};

/// Application name used for config and data directories
const APP_NAME: &str = "case-harness";

/// Fallback results directory when no platform data dir is available
const FALLBACK_RESULTS_DIR: &str = "results";

/// Log file written next to the results when file logging is enabled
pub const LOG_FILE_NAME: &str = "harness.log";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Default root under which every case gets its own result directory
pub fn default_results_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("results"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_RESULTS_DIR))
}

/// Result directory of a single case: `{results_dir}/{case_name}`
pub fn case_res_dir(results_dir: &Path, case_name: &str) -> PathBuf {
    results_dir.join(case_name)
}

/// Ensure a directory exists, creating parents as needed
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if !dir.is_dir() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}
