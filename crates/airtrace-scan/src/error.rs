//! Error types for the airtrace-scan crate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scan tool not found at path: {path}")]
    ToolNotFound { path: String },

    #[error("Scan tool exited with code {code}: {stderr}")]
    ScanFailed { code: i32, stderr: String },

    #[error("Scan timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("No wireless interface detected")]
    NoInterface,

    #[error("Sample capture not found: {}", path.display())]
    SampleNotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
