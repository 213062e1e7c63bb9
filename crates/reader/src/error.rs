//! Error types for buffered reads.

/// Errors produced while pulling bytes from the underlying stream.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stream closed by peer")]
    Closed,
}
