use tiny_ntrip_reader::BufferedReader;
use tokio::io::AsyncRead;
use tracing::{debug, warn};

use crate::{HEADER_LIMIT, LINE_LIMIT, ProtocolError};

/// Status line and headers of an accepted caster response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status_line: String,
    /// Logical headers after folding, in arrival order.
    pub headers: Vec<String>,
    /// Whether the body uses chunked transfer encoding.
    pub chunked: bool,
}

/// Folds header line fragments into logical headers.
///
/// A fragment ending in `,` continues on the next line; anything else
/// finishes the header. Whitespace-indented continuation lines are not
/// recognised, and a single-line header whose value ends in `,` swallows the
/// next one. Casters in the field are known to work with this rule, so it is
/// kept as is.
#[derive(Debug, Default)]
pub struct HeaderFolder {
    current: String,
    truncated: bool,
    headers: Vec<String>,
    chunked: bool,
}

impl HeaderFolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one line fragment. Overflow fragments never finish a header.
    pub fn push(&mut self, fragment: &str, overflow: bool) {
        self.append(fragment);

        if overflow {
            return;
        }

        if !fragment.ends_with(',') {
            self.finish();
        }
    }

    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn into_headers(self) -> Vec<String> {
        self.headers
    }

    fn append(&mut self, fragment: &str) {
        if self.truncated {
            return;
        }

        let room = HEADER_LIMIT.saturating_sub(self.current.len());
        if fragment.len() <= room {
            self.current.push_str(fragment);
            return;
        }

        let mut cut = room;
        while !fragment.is_char_boundary(cut) {
            cut -= 1;
        }
        self.current.push_str(&fragment[..cut]);
        self.truncated = true;
        warn!(header = %self.current, "header too long, dropping the rest");
    }

    fn finish(&mut self) {
        if self.current.starts_with("Transfer-Encoding: ") && self.current.contains("chunked") {
            self.chunked = true;
        }

        if !self.current.is_empty() {
            debug!(header = %self.current, "response header");
            self.headers.push(std::mem::take(&mut self.current));
        }
        self.truncated = false;
    }
}

/// Reads the status line, waiting for it if needed, and rejects anything
/// that does not end in `200 OK`.
///
/// On rejection nothing beyond the status line is consumed.
pub async fn read_status_line<R: AsyncRead + Unpin>(
    reader: &mut BufferedReader<R>,
) -> Result<String, ProtocolError> {
    let mut line = Vec::new();
    reader.read_line(&mut line, LINE_LIMIT, true).await?;

    let status = String::from_utf8_lossy(&line).into_owned();
    if !status.ends_with("200 OK") {
        return Err(ProtocolError::UnexpectedStatus(status));
    }
    Ok(status)
}

/// Reads headers up to the blank line.
///
/// A header line that has started is always read to its end. Running dry
/// between lines counts as the end of the headers.
pub async fn read_headers<R: AsyncRead + Unpin>(
    reader: &mut BufferedReader<R>,
) -> Result<HeaderFolder, ProtocolError> {
    let mut folder = HeaderFolder::new();
    let mut line = Vec::new();

    loop {
        let outcome = reader.read_line(&mut line, LINE_LIMIT, false).await?;
        folder.push(&String::from_utf8_lossy(&line), outcome.is_overflow());

        if line.is_empty() {
            return Ok(folder);
        }
    }
}

/// Reads and validates the full response head.
pub async fn read_response_head<R: AsyncRead + Unpin>(
    reader: &mut BufferedReader<R>,
) -> Result<ResponseHead, ProtocolError> {
    let status_line = read_status_line(reader).await?;
    let folder = read_headers(reader).await?;
    let chunked = folder.is_chunked();

    Ok(ResponseHead {
        status_line,
        headers: folder.into_headers(),
        chunked,
    })
}
