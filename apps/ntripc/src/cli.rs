//! Command line parsing and validation.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use clap::Parser;
use tiny_ntrip_protocol::{Credentials, NtripRequest};
use tiny_ntrip_relay::{DEFAULT_INTERVAL, RelayConfig};

use crate::config::FileConfig;

#[derive(Parser, Debug, Default)]
#[command(name = "ntripc", version)]
#[command(about = "Relay NTRIP correction data from a caster to a GNSS receiver")]
#[command(long_about = r#"
Relay NTRIP correction data from a caster to a GNSS receiver.

Connects to the caster, requests the mount point and writes the correction
stream to the device. Runs until killed, reconnecting after any failure.

Example:
  ntripc -s caster.example.com -p 2101 -m RTCM3 -u rover -x secret -d /dev/ttyS5 -i 1 -v
"#)]
pub struct Cli {
    /// IP or hostname of the NTRIP caster
    #[arg(short = 's', value_name = "SERVER")]
    pub server: Option<String>,

    /// Port of the NTRIP caster
    #[arg(short = 'p', value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Mount point of the desired data stream
    #[arg(short = 'm', value_name = "MOUNT")]
    pub mount: Option<String>,

    /// Device to forward corrections to
    #[arg(short = 'd', value_name = "DEVICE")]
    pub device: Option<PathBuf>,

    /// User name for the caster
    #[arg(short = 'u', value_name = "USER")]
    pub user: Option<String>,

    /// Password for the caster
    #[arg(short = 'x', value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Seconds to wait between reads of new correction data; 0 polls
    /// continuously [default: 10]
    #[arg(short = 'i', value_name = "INTERVAL")]
    pub interval: Option<u64>,

    /// Enable verbose output
    #[arg(short = 'v')]
    pub verbose: bool,

    /// TOML file providing any of the options above
    #[arg(short = 'c', value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

/// Validated settings; command line values win over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server: String,
    pub port: u16,
    pub mount: String,
    pub device: Option<PathBuf>,
    pub credentials: Option<Credentials>,
    pub interval: Duration,
    pub verbose: bool,
}

impl Cli {
    /// Loads the config file, if any, and validates the merged options.
    pub fn resolve(self) -> anyhow::Result<Settings> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        self.merge(file)
    }

    fn merge(self, file: FileConfig) -> anyhow::Result<Settings> {
        let server = self.server.or(file.server);
        let port = self.port.or(file.port).filter(|&port| port > 0);
        let mount = self.mount.or(file.mount);
        let user = self.user.or(file.user);
        let password = self.password.or(file.password);

        let mut problems = Vec::new();
        if server.is_none() {
            problems.push("missing required option: server (-s)");
        }
        if port.is_none() {
            problems.push("missing required option: port (-p)");
        }
        if user.is_some() != password.is_some() {
            problems.push("a username and password must both be specified");
        }
        if mount.is_none() {
            problems.push("missing required option: mount (-m)");
        }

        let (Some(server), Some(port), Some(mount)) = (server, port, mount) else {
            bail!(problems.join("; "));
        };
        if !problems.is_empty() {
            bail!(problems.join("; "));
        }

        let credentials = user
            .zip(password)
            .map(|(user, password)| Credentials::new(user, password));
        let interval = self
            .interval
            .or(file.interval)
            .map_or(DEFAULT_INTERVAL, Duration::from_secs);

        Ok(Settings {
            server,
            port,
            mount,
            device: self.device.or(file.device),
            credentials,
            interval,
            verbose: self.verbose || file.verbose.unwrap_or(false),
        })
    }
}

impl Settings {
    pub fn relay_config(&self) -> RelayConfig {
        let mut config = RelayConfig::new(NtripRequest {
            mount: self.mount.clone(),
            host: self.server.clone(),
            port: self.port,
            credentials: self.credentials.clone(),
        });
        config.interval = self.interval;
        config
    }
}
