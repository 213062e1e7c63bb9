//! One connection's worth of relaying.

use std::time::Duration;

use tiny_ntrip_protocol::read_response_head;
use tiny_ntrip_reader::BufferedReader;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::{BodyRelay, Forwarder, PassEnd, RelayError};

/// Sends `request` over `stream`, validates the response head and relays
/// the body until the caster sends the terminating chunk.
///
/// Returns `Ok(())` only for that clean end. A raw body never ends cleanly:
/// its session finishes with the read error that closed the stream.
pub async fn run_session<S, W>(
    stream: &mut S,
    request: &str,
    forwarder: &mut Forwarder<W>,
    interval: Duration,
) -> Result<(), RelayError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    W: AsyncWrite + Unpin,
{
    stream.write_all(request.as_bytes()).await?;
    stream.flush().await?;
    info!(bytes = request.len(), "request sent");

    let mut reader = BufferedReader::new(&mut *stream);
    let head = read_response_head(&mut reader).await?;
    info!(
        status = %head.status_line,
        headers = head.headers.len(),
        chunked = head.chunked,
        "response accepted"
    );

    let mut body = BodyRelay::new(head.chunked);
    if body.is_chunked() {
        info!("using chunked transfer encoding");
    }
    loop {
        info!("reading correction data");
        let pass = body.pass(&mut reader, forwarder).await?;
        info!(
            bytes = pass.bytes,
            forwarded = forwarder.has_sink(),
            total = forwarder.forwarded(),
            "relay pass finished"
        );

        if pass.end == PassEnd::Terminated {
            return Ok(());
        }

        if interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(interval).await;
        }
    }
}
