use thiserror::Error;

/// Errors that can occur while reading or writing a token stream.
#[derive(Error, Debug)]
pub enum StreamError {
    /// I/O error from the underlying source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Input is not a well-formed JSON document, or structural tokens do not match.
    ///
    /// The read position is undefined afterwards; the caller must abort.
    #[error("malformed stream at offset {offset}: {reason}")]
    Malformed {
        /// Byte offset at which the problem was detected.
        offset: u64,
        /// Reason for the failure.
        reason: String,
    },
    /// Writer call that would produce an invalid document.
    #[error("invalid writer state: {0}")]
    InvalidState(String),
    /// The writer (or the sink underneath it) has been closed.
    #[error("stream closed")]
    StreamClosed,
}

impl StreamError {
    /// Returns true if this is a [`StreamError::Malformed`] error.
    pub fn is_malformed(&self) -> bool {
        matches!(self, StreamError::Malformed { .. })
    }
}
