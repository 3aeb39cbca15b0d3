//! Runner configuration.
//!
//! Everything here has a built-in default matching the values the unit was
//! calibrated with, so a config file is optional; CLI flags override the
//! file.

use std::path::Path;

use chillerlink_control::{SafetyLimits, SchedulerConfig};
use gree_protocol::EncodeProfile;
use serde::{Deserialize, Serialize};

use crate::error::RunnerError;

/// Which link to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    /// Direct UART connection.
    Serial {
        /// Device path.
        path: String,
        /// Baud rate.
        baud: u32,
    },
    /// The network status feed.
    Tcp {
        /// `host:port` of the feed.
        addr: String,
    },
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig::Serial {
            path: "/dev/serial0".to_string(),
            baud: 9600,
        }
    }
}

/// Top-level runner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Safety limits the guard evaluates against.
    pub limits: SafetyLimits,
    /// Scheduler timing and intents.
    pub scheduler: SchedulerConfig,
    /// Which link to open.
    pub transport: TransportConfig,
    /// Which control-frame placement this unit accepts.
    #[serde(default = "default_encode_profile")]
    pub encode_profile: EncodeProfile,
}

fn default_encode_profile() -> EncodeProfile {
    EncodeProfile::FixedOffset
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            limits: SafetyLimits::default(),
            scheduler: SchedulerConfig::default(),
            transport: TransportConfig::default(),
            encode_profile: default_encode_profile(),
        }
    }
}

impl RunnerConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, RunnerError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }
}
