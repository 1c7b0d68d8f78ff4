//! Error types for sprint-update
//!
//! Provides one thiserror enum per concern. Cache and codec errors are absorbed
//! by the caching layer; clipboard, report and prompt errors reach the CLI.

use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by the persisted cache store.
///
/// These never reach the end user: the store and the memoizer log them and
/// fall back to cache-miss behavior.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is empty or exceeds the maximum length
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    /// Backing storage could not be read or written
    #[error("Cache unavailable at {path}: {reason}")]
    Unavailable { path: PathBuf, reason: String },
}

// == Codec Error Enum ==
/// Errors raised while crossing the serialize/deserialize boundary.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to encode value: {0}")]
    Encode(String),

    #[error("Failed to decode value: {0}")]
    Decode(String),
}

// == Clipboard Error Enum ==
/// Errors raised while delivering content to the OS clipboard.
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// The current OS has no supported clipboard pipeline
    #[error("Clipboard copy is only supported on macOS")]
    UnsupportedPlatform,

    /// An external utility could not be spawned, fed, or exited non-zero
    #[error("{program} failed: {reason}")]
    ConversionFailure { program: String, reason: String },

    /// Local I/O failure around the temporary artifact
    #[error("Clipboard I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClipboardError {
    /// Builds a `ConversionFailure` for the given program.
    pub fn conversion(program: &str, reason: impl Into<String>) -> Self {
        ClipboardError::ConversionFailure {
            program: program.to_string(),
            reason: reason.into(),
        }
    }
}

// == Report Error Enum ==
/// Errors raised by the report producer.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The window starts after it ends
    #[error("Invalid report window: {start} is after {end}")]
    InvalidWindow { start: String, end: String },

    /// No report command was configured
    #[error("No report command configured (set SPRINT_UPDATE_REPORT_CMD or pass --report-cmd)")]
    NotConfigured,

    /// The report command could not be started
    #[error("Failed to run report command `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    /// The report command exited with a non-zero status
    #[error("Report command `{command}` exited with status {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },

    /// The report command produced non UTF-8 output
    #[error("Report command `{command}` produced invalid UTF-8 output")]
    InvalidOutput { command: String },
}

// == Prompt Error Enum ==
/// Errors raised by the interactive delivery prompt.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Prompt failed: {0}")]
    Interaction(String),
}

// == Delivery Error Enum ==
/// Errors raised while delivering the report after the user picked an option.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

// == Result Type Aliases ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Convenience Result type for clipboard operations.
pub type ClipboardResult<T> = std::result::Result<T, ClipboardError>;
