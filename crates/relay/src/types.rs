use std::time::Duration;

use tiny_ntrip_protocol::NtripRequest;

use crate::{DEFAULT_INTERVAL, DEVICE_RETRY_DELAY, RECONNECT_DELAY, RelayError};

/// Fixed retry delays. There is no backoff and no attempt limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait after a connection attempt ends, before the next connect.
    pub reconnect_delay: Duration,
    /// Wait between attempts to open the output device.
    pub device_retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            reconnect_delay: RECONNECT_DELAY,
            device_retry_delay: DEVICE_RETRY_DELAY,
        }
    }
}

/// Everything a [`Relay`](crate::Relay) needs to reach the caster.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Request to send; its host and port are also the connect address.
    pub request: NtripRequest,
    /// Sleep between relay passes.
    pub interval: Duration,
    pub retry: RetryPolicy,
}

impl RelayConfig {
    pub fn new(request: NtripRequest) -> Self {
        Self {
            request,
            interval: DEFAULT_INTERVAL,
            retry: RetryPolicy::default(),
        }
    }
}

/// How one relay pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassEnd {
    /// Everything currently available was relayed.
    Idle,
    /// The caster sent the zero-length chunk.
    Terminated,
}

/// Summary of one relay pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    /// Body bytes relayed during the pass.
    pub bytes: usize,
    pub end: PassEnd,
}

/// Result of one connect-and-relay attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The caster ended the chunked body cleanly.
    Terminated,
    Failed(RelayError),
}
