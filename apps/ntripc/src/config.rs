//! Optional TOML configuration file.
//!
//! Every key is optional and mirrors a command line flag:
//!
//! ```toml
//! server = "caster.example.com"
//! port = 2101
//! mount = "RTCM3_NEAREST"
//! device = "/dev/ttyS5"
//! user = "rover"
//! password = "secret"
//! interval = 1
//! verbose = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Values read from the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub mount: Option<String>,
    pub device: Option<PathBuf>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Seconds between relay passes.
    pub interval: Option<u64>,
    pub verbose: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }
}
