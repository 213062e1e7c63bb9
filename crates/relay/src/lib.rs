//! NTRIP correction relay.
//!
//! Connects to a caster, validates the response head, decodes the chunked
//! or raw body and forwards the correction bytes to a device, reconnecting
//! forever with a fixed delay.

pub mod body;
pub mod client;
pub mod device;
pub mod error;
pub mod forward;
pub mod session;
pub mod types;

pub use body::BodyRelay;
pub use client::{Connect, Relay, TcpConnector};
pub use device::{DeviceSink, open_device, open_device_with_retry};
pub use error::RelayError;
pub use forward::Forwarder;
pub use session::run_session;
pub use types::{AttemptOutcome, Pass, PassEnd, RelayConfig, RetryPolicy};

use std::time::Duration;

/// Largest body segment relayed to the device in one write.
pub const RELAY_BUFFER_SIZE: usize = 1000;

/// Delay between relay passes unless configured otherwise.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Delay before reconnecting after any failed or finished attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// Delay between attempts to open the output device.
pub const DEVICE_RETRY_DELAY: Duration = Duration::from_secs(2);
