//! MetricsConfig - Config Loader output
//!
//! Describes which backend to activate, how service names and hosts are
//! rewritten, and where the network backend connects.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Complete publishing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Backend to activate at startup (None = publishing is a no-op)
    #[serde(default)]
    pub backend: Option<String>,

    /// Prepended to every service name
    #[serde(default)]
    pub prefix: String,

    /// Default host for events without one (None = machine hostname)
    #[serde(default)]
    pub host: Option<String>,

    /// Network backend settings
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Network backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Transport protocol
    #[serde(default)]
    pub protocol: Protocol,

    /// Collector address (host:port)
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Frame encoding
    #[serde(default)]
    pub format: WireFormat,

    /// Largest UDP datagram the transport will emit
    #[serde(default = "default_max_datagram_size")]
    pub max_datagram_size: usize,

    /// Static attributes added to every wire event
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            addr: default_addr(),
            format: WireFormat::default(),
            max_datagram_size: default_max_datagram_size(),
            attributes: HashMap::new(),
        }
    }
}

fn default_addr() -> String {
    "127.0.0.1:5555".to_string()
}

fn default_max_datagram_size() -> usize {
    65000
}

/// Transport protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Udp => f.write_str("udp"),
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            other => Err(format!("unknown protocol '{}'", other)),
        }
    }
}

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// Newline-delimited JSON
    #[default]
    Json,
    /// Length-prefixed bincode
    Bincode,
}

impl FromStr for WireFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "bincode" => Ok(Self::Bincode),
            other => Err(format!("unknown format '{}'", other)),
        }
    }
}
