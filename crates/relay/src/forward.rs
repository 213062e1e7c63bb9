//! Ordered forwarding of correction bytes to an optional sink.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;

/// Hands relayed bytes to the output device, in arrival order.
///
/// Without a sink the bytes are dropped. Write failures are logged and do
/// not interrupt the relay.
pub struct Forwarder<W> {
    sink: Option<W>,
    forwarded: u64,
}

impl<W: AsyncWrite + Unpin> Forwarder<W> {
    pub fn new(sink: Option<W>) -> Self {
        Self { sink, forwarded: 0 }
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Total bytes successfully written to the sink.
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    pub fn sink(&self) -> Option<&W> {
        self.sink.as_ref()
    }

    /// Installs `sink`, replacing any previous one.
    pub fn attach(&mut self, sink: W) {
        self.sink = Some(sink);
    }

    pub async fn forward(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };

        let result = async {
            sink.write_all(bytes).await?;
            sink.flush().await
        }
        .await;

        match result {
            Ok(()) => self.forwarded += bytes.len() as u64,
            Err(e) => warn!(error = %e, bytes = bytes.len(), "failed to forward correction data"),
        }
    }
}
