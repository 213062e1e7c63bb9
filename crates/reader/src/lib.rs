//! Buffered pull-reader over a single async byte stream.
//!
//! A [`BufferedReader`] owns one read buffer with `start`/`end` cursors and
//! serves three kinds of requests on top of it:
//!
//! - [`BufferedReader::read_line`]: one `\n`-terminated line.
//! - [`BufferedReader::read_until_idle`]: whatever is available right now.
//! - [`BufferedReader::read_exact`]: exactly N bytes.
//!
//! Whatever a request does not consume stays buffered for the next one, so
//! short control lines and large opaque payloads can be pulled back-to-back
//! from the same connection.

mod buffer;
mod error;

pub use buffer::{BufferedReader, ReadOutcome};
pub use error::ReadError;

/// Initial size of the read buffer.
///
/// The buffer grows when a single line needs more room than this.
pub const DEFAULT_CAPACITY: usize = 512;
