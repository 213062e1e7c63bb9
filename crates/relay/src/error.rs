//! Error types for the relay.

use tiny_ntrip_protocol::ProtocolError;
use tiny_ntrip_reader::ReadError;

/// Errors that end one connection attempt.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("read error: {0}")]
    Read(#[from] ReadError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
