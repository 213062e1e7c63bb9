//! Caster connection and the reconnect loop.

use std::convert::Infallible;
use std::future::Future;
use std::io;

use tiny_ntrip_protocol::ProtocolError;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{info, warn};

use crate::{AttemptOutcome, Forwarder, RelayConfig, run_session};

/// Opens the byte stream a session runs over.
pub trait Connect {
    type Stream: AsyncRead + AsyncWrite + Unpin;

    fn connect(&mut self, host: &str, port: u16)
    -> impl Future<Output = io::Result<Self::Stream>>;
}

/// Plain TCP to the caster.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

impl Connect for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&mut self, host: &str, port: u16) -> io::Result<TcpStream> {
        TcpStream::connect((host, port)).await
    }
}

/// Relays one mount point forever.
///
/// The request is encoded once up front; the forwarder (and the device it
/// owns) outlives every connection.
pub struct Relay<C, W> {
    config: RelayConfig,
    request: String,
    connector: C,
    forwarder: Forwarder<W>,
    attempts: u64,
}

impl<C, W> Relay<C, W>
where
    C: Connect,
    W: AsyncWrite + Unpin,
{
    /// Fails only when the request cannot be encoded.
    pub fn new(
        config: RelayConfig,
        connector: C,
        forwarder: Forwarder<W>,
    ) -> Result<Self, ProtocolError> {
        let request = config.request.encode()?;
        Ok(Self {
            config,
            request,
            connector,
            forwarder,
            attempts: 0,
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Attaches the output device; bytes relayed from now on reach it.
    pub fn attach_device(&mut self, device: W) {
        self.forwarder.attach(device);
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn forwarder(&self) -> &Forwarder<W> {
        &self.forwarder
    }

    /// Connection attempts made so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Connects once and relays until the session ends. The connection is
    /// closed on return.
    pub async fn attempt(&mut self) -> AttemptOutcome {
        self.attempts += 1;
        let request = &self.config.request;
        info!(
            server = %request.host,
            port = request.port,
            mount = %request.mount,
            attempt = self.attempts,
            "connecting to caster"
        );

        let mut stream = match self.connector.connect(&request.host, request.port).await {
            Ok(stream) => stream,
            Err(e) => return AttemptOutcome::Failed(e.into()),
        };

        match run_session(
            &mut stream,
            &self.request,
            &mut self.forwarder,
            self.config.interval,
        )
        .await
        {
            Ok(()) => AttemptOutcome::Terminated,
            Err(e) => AttemptOutcome::Failed(e),
        }
    }

    /// Runs attempts back to back, waiting the reconnect delay after each.
    pub async fn run(&mut self) -> Infallible {
        loop {
            match self.attempt().await {
                AttemptOutcome::Terminated => info!("caster ended the correction stream"),
                AttemptOutcome::Failed(e) => warn!(error = %e, "connection attempt failed"),
            }

            let delay = self.config.retry.reconnect_delay;
            warn!(
                attempt = self.attempts,
                delay_secs = delay.as_secs(),
                "reconnecting"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
