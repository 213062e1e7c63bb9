//! NTRIP wire protocol: the client request and the caster's HTTP/1.1
//! response head and chunk framing.
//!
//! Parsing is done byte-for-byte on top of a
//! [`tiny_ntrip_reader::BufferedReader`]; there is no HTTP library involved.

mod chunk;
mod request;
mod response;

pub use chunk::{ChunkHeader, parse_chunk_size};
pub use request::{Credentials, NtripRequest, encode_base64};
pub use response::{HeaderFolder, ResponseHead, read_headers, read_response_head, read_status_line};

use tiny_ntrip_reader::ReadError;

/// Longest status or header line consumed per read, including the newline.
pub const LINE_LIMIT: usize = 200;

/// Cap on one folded logical header.
pub const HEADER_LIMIT: usize = 200;

/// Cap on the `user:password` string before encoding.
pub const MAX_CREDENTIALS_LEN: usize = 99;

/// Cap on the whole encoded request.
pub const MAX_REQUEST_LEN: usize = 1000;

/// Value of the `User-Agent` request header.
pub const USER_AGENT: &str = concat!("NTRIP tiny-ntrip/", env!("CARGO_PKG_VERSION"));

/// Errors produced while talking to a caster.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("read error: {0}")]
    Read(#[from] ReadError),

    #[error("unexpected response from server: '{0}'")]
    UnexpectedStatus(String),

    #[error("unexpected chunk size: '{0}'")]
    ChunkSize(String),

    #[error("user/password too long: {0} bytes")]
    CredentialsTooLong(usize),

    #[error("request too long: {0} bytes")]
    RequestTooLong(usize),
}
