//! TOML configuration for the gateway node.
//!
//! ```toml
//! [station]
//! mycall = "OH7LZB"
//! aprsis_login = "OH7LZB-10"
//!
//! [[interfaces]]
//! kind = "serial_kiss"
//! device = "/dev/ttyUSB0"
//! callsign = "OH7LZB-1"
//! tx_ok = true
//!
//! [[digipeaters]]
//! transmitter = "OH7LZB-1"
//!
//! [[digipeaters.sources]]
//! interface = "APRSIS"
//! msg_via_path = "WIDE1-1"
//! ```
//!
//! Interfaces are registered in file order after the built-in APRS-IS
//! interface, which is what their default igate groups follow.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use digigate_core::address::{Ax25Address, validate_callsign};
use digigate_transport::interface::{APRSIS_CALLSIGN, MAX_IF_GROUP};
use digigate_transport::InterfaceKind;

use crate::error::NodeError;

/// Top-level node configuration loaded from a TOML file.
#[derive(Debug, Deserialize)]
pub struct NodeConfig {
    pub station: StationSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub interfaces: Vec<InterfaceEntry>,
    #[serde(default)]
    pub digipeaters: Vec<DigipeaterEntry>,
    #[serde(default)]
    pub beacons: Vec<BeaconEntry>,
}

impl NodeConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("failed to read config file: {e}")))?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s)
            .map_err(|e| NodeError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check everything the registry would reject, before anything is
    /// registered.
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.station.mycall.is_empty() {
            return Err(NodeError::Config("station mycall is empty".into()));
        }

        let mut seen = HashSet::from([APRSIS_CALLSIGN.to_ascii_uppercase()]);
        for iface in &self.interfaces {
            if !seen.insert(iface.callsign.to_ascii_uppercase()) {
                return Err(NodeError::Config(format!(
                    "duplicate interface callsign {}",
                    iface.callsign
                )));
            }
            let requires_tx = iface.tx_ok && !matches!(iface.kind, InterfaceKindEntry::Null);
            if !validate_callsign(&iface.callsign, requires_tx) {
                return Err(NodeError::Config(format!(
                    "invalid interface callsign {:?}",
                    iface.callsign
                )));
            }
            if let Some(group) = iface.group {
                if !(1..MAX_IF_GROUP).contains(&group) {
                    return Err(NodeError::Config(format!(
                        "interface {} group {group} outside 1..{MAX_IF_GROUP}",
                        iface.callsign
                    )));
                }
            }
        }

        for digi in &self.digipeaters {
            let Some(tx) = self.interface(&digi.transmitter) else {
                return Err(NodeError::Config(format!(
                    "digipeater transmitter {} is not a configured interface",
                    digi.transmitter
                )));
            };
            if !tx.tx_ok {
                return Err(NodeError::Config(format!(
                    "digipeater transmitter {} has tx_ok = false",
                    digi.transmitter
                )));
            }
            for source in &digi.sources {
                let known = source.interface.eq_ignore_ascii_case(APRSIS_CALLSIGN)
                    || self.interface(&source.interface).is_some();
                if !known {
                    return Err(NodeError::Config(format!(
                        "digipeater source {} is not a configured interface",
                        source.interface
                    )));
                }
                source.via()?;
                source.msg_via()?;
            }
        }

        for beacon in &self.beacons {
            if self.interface(&beacon.interface).is_none() {
                return Err(NodeError::Config(format!(
                    "beacon interface {} is not a configured interface",
                    beacon.interface
                )));
            }
        }
        Ok(())
    }

    /// Configured interface by callsign, case-insensitive.
    pub fn interface(&self, callsign: &str) -> Option<&InterfaceEntry> {
        self.interfaces
            .iter()
            .find(|i| i.callsign.eq_ignore_ascii_case(callsign))
    }
}

/// The `[station]` section.
#[derive(Debug, Deserialize)]
pub struct StationSection {
    pub mycall: String,
    pub aprsis_login: Option<String>,
    /// Seconds between beacon rounds. 0 sends beacons once at startup.
    #[serde(default = "default_beacon_interval")]
    pub beacon_interval: u64,
}

fn default_beacon_interval() -> u64 {
    1200
}

/// The `[logging]` section.
#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// An `[[interfaces]]` entry.
#[derive(Debug, Deserialize)]
pub struct InterfaceEntry {
    pub callsign: String,
    #[serde(flatten)]
    pub kind: InterfaceKindEntry,
    #[serde(default)]
    pub tx_ok: bool,
    #[serde(default = "default_true")]
    pub telemetry_to_is: bool,
    #[serde(default = "default_true")]
    pub telemetry_to_rf: bool,
    /// Pinned igate group, `1..8`.
    pub group: Option<u16>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// The kind-specific part of an interface entry, selected by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterfaceKindEntry {
    Ax25Device {
        device: String,
    },
    SerialKiss {
        device: String,
        #[serde(default)]
        subif: u8,
    },
    TcpKiss {
        host: String,
        tcp_port: u16,
        #[serde(default)]
        subif: u8,
    },
    Agwpe {
        host: String,
        tcp_port: u16,
    },
    Null,
}

impl From<&InterfaceKindEntry> for InterfaceKind {
    fn from(entry: &InterfaceKindEntry) -> Self {
        match entry.clone() {
            InterfaceKindEntry::Ax25Device { device } => InterfaceKind::Ax25Device { device },
            InterfaceKindEntry::SerialKiss { device, subif } => {
                InterfaceKind::SerialKiss { device, port: subif }
            }
            InterfaceKindEntry::TcpKiss {
                host,
                tcp_port,
                subif,
            } => InterfaceKind::TcpKiss {
                host,
                tcp_port,
                port: subif,
            },
            InterfaceKindEntry::Agwpe { host, tcp_port } => InterfaceKind::Agwpe { host, tcp_port },
            InterfaceKindEntry::Null => InterfaceKind::Null,
        }
    }
}

/// A `[[digipeaters]]` entry.
#[derive(Debug, Deserialize)]
pub struct DigipeaterEntry {
    /// Callsign of the transmitting interface.
    pub transmitter: String,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

/// A `[[digipeaters.sources]]` entry.
#[derive(Debug, Deserialize)]
pub struct SourceEntry {
    /// Callsign of the receiving interface, or `APRSIS`.
    pub interface: String,
    pub via_path: Option<String>,
    pub msg_via_path: Option<String>,
    #[serde(default)]
    pub filter: FilterEntry,
}

impl SourceEntry {
    /// Parsed ordinary via path.
    pub fn via(&self) -> Result<Option<Ax25Address>, NodeError> {
        parse_via(self.via_path.as_deref())
    }

    /// Parsed message via path.
    pub fn msg_via(&self) -> Result<Option<Ax25Address>, NodeError> {
        parse_via(self.msg_via_path.as_deref())
    }
}

fn parse_via(text: Option<&str>) -> Result<Option<Ax25Address>, NodeError> {
    text.map(|t| {
        Ax25Address::parse(t).map_err(|e| NodeError::Config(format!("invalid via path {t:?}: {e}")))
    })
    .transpose()
}

/// Originator lists of a source filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterEntry {
    #[serde(default)]
    pub accept: Vec<String>,
    #[serde(default)]
    pub reject: Vec<String>,
}

impl FilterEntry {
    /// Neither list has entries.
    pub fn is_empty(&self) -> bool {
        self.accept.is_empty() && self.reject.is_empty()
    }
}

/// A `[[beacons]]` entry.
#[derive(Debug, Deserialize)]
pub struct BeaconEntry {
    /// Callsign of the interface to send on.
    pub interface: String,
    /// Source callsign; defaults to the interface callsign.
    pub source: Option<String>,
    #[serde(default = "default_beacon_dest")]
    pub dest: String,
    pub via: Option<String>,
    /// APRS information field, without control and PID bytes.
    pub payload: String,
}

fn default_beacon_dest() -> String {
    "APRS".to_string()
}
