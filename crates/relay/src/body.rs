//! Response body relay, chunked or raw.

use tiny_ntrip_protocol::{ChunkHeader, parse_chunk_size};
use tiny_ntrip_reader::{BufferedReader, ReadOutcome};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::{Forwarder, Pass, PassEnd, RELAY_BUFFER_SIZE, RelayError};

/// Decodes the body of one connection, one pass at a time.
///
/// A pass relays the data that is available now. In chunked mode it runs
/// `size line → chunk body → size line → …` until the stream goes quiet or
/// the zero-length chunk arrives; in raw mode it forwards whatever is
/// available, waiting for at least one byte.
pub struct BodyRelay {
    chunked: bool,
    line: Vec<u8>,
    segment: Vec<u8>,
}

impl BodyRelay {
    pub fn new(chunked: bool) -> Self {
        Self {
            chunked,
            line: Vec::with_capacity(RELAY_BUFFER_SIZE),
            segment: vec![0; RELAY_BUFFER_SIZE],
        }
    }

    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    pub async fn pass<R, W>(
        &mut self,
        reader: &mut BufferedReader<R>,
        forwarder: &mut Forwarder<W>,
    ) -> Result<Pass, RelayError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if self.chunked {
            self.chunked_pass(reader, forwarder).await
        } else {
            self.raw_pass(reader, forwarder).await
        }
    }

    async fn chunked_pass<R, W>(
        &mut self,
        reader: &mut BufferedReader<R>,
        forwarder: &mut Forwarder<W>,
    ) -> Result<Pass, RelayError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut bytes = 0;

        loop {
            // Blank lines are the CRLF trailing each chunk body.
            loop {
                let outcome = reader
                    .read_line(&mut self.line, RELAY_BUFFER_SIZE, false)
                    .await?;
                if outcome == ReadOutcome::EndOfStream {
                    return Ok(Pass {
                        bytes,
                        end: PassEnd::Idle,
                    });
                }
                if !self.line.is_empty() {
                    break;
                }
            }

            let size = match parse_chunk_size(&String::from_utf8_lossy(&self.line))? {
                ChunkHeader::Size(size) => size,
                ChunkHeader::Terminator => {
                    debug!("terminating chunk received");
                    return Ok(Pass {
                        bytes,
                        end: PassEnd::Terminated,
                    });
                }
            };

            debug!(size, forwarding = forwarder.has_sink(), "read chunk");

            let mut remaining = size;
            while remaining > 0 {
                let len = remaining.min(self.segment.len());
                reader.read_exact(&mut self.segment[..len]).await?;
                forwarder.forward(&self.segment[..len]).await;
                remaining -= len;
                bytes += len;
            }
        }
    }

    async fn raw_pass<R, W>(
        &mut self,
        reader: &mut BufferedReader<R>,
        forwarder: &mut Forwarder<W>,
    ) -> Result<Pass, RelayError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut bytes = 0;

        loop {
            let outcome = reader
                .read_until_idle(&mut self.line, RELAY_BUFFER_SIZE, true)
                .await?;
            forwarder.forward(&self.line).await;
            bytes += outcome.bytes();

            if !outcome.is_overflow() {
                return Ok(Pass {
                    bytes,
                    end: PassEnd::Idle,
                });
            }
        }
    }
}
