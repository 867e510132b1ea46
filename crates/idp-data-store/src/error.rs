//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error while reading or writing a snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Snapshot is not valid JSON or has an unexpected shape.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
    /// Token stream error raised by a visitor.
    #[error("stream error: {0}")]
    Stream(#[from] idp_data_stream::StreamError),
    /// Entity rejected by the store.
    #[error("invalid entity: {0}")]
    InvalidEntity(String),
}
