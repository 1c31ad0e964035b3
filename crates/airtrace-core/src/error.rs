use thiserror::Error;

/// Top-level error type for airtrace domain types.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid MAC address format: {0}")]
    InvalidMac(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
