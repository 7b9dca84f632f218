//! Error types for the harness
//!
//! Only resource-class failures travel as errors. Configuration errors,
//! deadline expiry and non-zero exits are ordinary execution outcomes (see
//! [`crate::exec::Execution`]) and never show up here.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Resource Errors ===
    #[error("Cannot create result directory '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write result file '{}': {source}", .path.display())]
    ResultFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to spawn '{cmd}': {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: io::Error,
    },

    // === Structured Results Errors ===
    #[error("No results to score: the results list is empty")]
    EmptyResults,

    #[error("Result entry {index} has no 'status' field")]
    MissingStatus { index: usize },

    #[error("Expected a JSON array of results, got {0}")]
    NotAList(String),

    // === Registry Errors ===
    #[error("Unknown test case kind '{kind}'. Known kinds: {known}")]
    UnknownKind { kind: String, known: String },

    // === Lifecycle Errors ===
    #[error("execute() panicked: {0}")]
    Panicked(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a result directory error
    pub fn create_dir(path: &Path, source: io::Error) -> Self {
        Self::CreateDir {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a result file error
    pub fn result_file(path: &Path, source: io::Error) -> Self {
        Self::ResultFile {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a spawn error
    pub fn spawn(cmd: &str, source: io::Error) -> Self {
        Self::Spawn {
            cmd: cmd.to_string(),
            source,
        }
    }

    /// Create a file read error
    pub fn file_read(path: &Path, error: impl ToString) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}
