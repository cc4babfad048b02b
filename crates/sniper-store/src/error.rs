//! Store errors.

use thiserror::Error;

/// Store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid store location.
    #[error("Invalid store path: {0}")]
    InvalidPath(String),
}

impl From<StoreError> for sniper_protocols::CaptureError {
    fn from(err: StoreError) -> Self {
        sniper_protocols::CaptureError::Store(err.to_string())
    }
}
