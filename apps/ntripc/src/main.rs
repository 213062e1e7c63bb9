//! NTRIP client entry point.

mod cli;
mod config;

use std::convert::Infallible;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tiny_ntrip_relay::{DeviceSink, Forwarder, Relay, TcpConnector, open_device_with_retry};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let settings = match cli.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(1);
        }
    };

    // RUST_LOG wins over -v.
    let default_level = if settings.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let forwarder = Forwarder::<DeviceSink>::new(None);
    let relay = match Relay::new(settings.relay_config(), TcpConnector, forwarder) {
        Ok(relay) => relay,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    let config = relay.config();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        server = %config.request.host,
        port = config.request.port,
        mount = %config.request.mount,
        interval_secs = config.interval.as_secs(),
        "starting NTRIP client"
    );

    match run(relay, settings.device) {
        Ok(never) => match never {},
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Opens the device (waiting for it if needed) and relays forever.
fn run(
    mut relay: Relay<TcpConnector, DeviceSink>,
    device: Option<PathBuf>,
) -> anyhow::Result<Infallible> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    Ok(rt.block_on(async move {
        if let Some(path) = device {
            let retry_delay = relay.config().retry.device_retry_delay;
            relay.attach_device(open_device_with_retry(&path, retry_delay).await);
        }
        relay.run().await
    }))
}
