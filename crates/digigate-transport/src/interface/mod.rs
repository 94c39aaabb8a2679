//! Logical interfaces: one per radio port, network link or the APRS-IS
//! uplink.

pub mod accounting;
pub mod kind;
pub mod registry;

use std::fmt;
use std::rc::Rc;

use digigate_core::address::{Ax25Address, validate_callsign};
use digigate_core::framing::kiss::kiss_frame;

use crate::digipeater::DigipeaterSource;
use crate::error::{RegistryError, TransportError};
use crate::services::Transport;

pub use accounting::{TrafficCounters, TrafficSnapshot};
pub use kind::InterfaceKind;
pub use registry::InterfaceRegistry;

/// Number of interface groups, including group 0 for APRS-IS.
pub const MAX_IF_GROUP: u16 = 8;

/// Group of the APRS-IS pseudo-interface.
pub const APRSIS_GROUP: u16 = 0;

/// Callsign the APRS-IS pseudo-interface is registered under.
pub const APRSIS_CALLSIGN: &str = "APRSIS";

/// Digipeat aliases used when an interface configures none.
pub const DEFAULT_ALIASES: [&str; 3] = ["RELAY", "WIDE", "TRACE"];

/// Position of an interface in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceIndex(pub usize);

impl fmt::Display for InterfaceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if#{}", self.0)
    }
}

/// Configuration of an interface before registration.
#[derive(Debug, Clone)]
pub struct InterfaceSpec {
    pub callsign: String,
    pub kind: InterfaceKind,
    pub tx_ok: bool,
    pub telemetry_to_is: bool,
    pub telemetry_to_rf: bool,
    pub group: Option<u16>,
    pub aliases: Vec<String>,
}

impl InterfaceSpec {
    /// Receive-only spec in an automatically assigned group.
    pub fn new(callsign: impl Into<String>, kind: InterfaceKind) -> Self {
        Self {
            callsign: callsign.into(),
            kind,
            tx_ok: false,
            telemetry_to_is: true,
            telemetry_to_rf: true,
            group: None,
            aliases: Vec::new(),
        }
    }

    /// Allow or forbid transmission.
    pub fn transmitting(mut self, tx_ok: bool) -> Self {
        self.tx_ok = tx_ok;
        self
    }

    /// Pin the igate group, `1..MAX_IF_GROUP`.
    pub fn in_group(mut self, group: u16) -> Self {
        self.group = Some(group);
        self
    }

    /// Digipeat aliases; the defaults are used when left empty.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }
}

/// A registered interface.
pub struct Interface {
    index: InterfaceIndex,
    group: u16,
    callsign: String,
    ax25_address: Option<Ax25Address>,
    kind: InterfaceKind,
    tx_ok: bool,
    telemetry_to_is: bool,
    telemetry_to_rf: bool,
    aliases: Vec<String>,
    sources: Vec<DigipeaterSource>,
    counters: TrafficCounters,
    transport: Option<Rc<dyn Transport>>,
}

impl Interface {
    /// Validate a spec and build the interface at the given slot.
    pub(crate) fn from_spec(
        spec: InterfaceSpec,
        index: InterfaceIndex,
        group: u16,
    ) -> Result<Self, RegistryError> {
        let requires_tx = spec.tx_ok && spec.kind != InterfaceKind::Null;
        if !validate_callsign(&spec.callsign, requires_tx) {
            return Err(RegistryError::InvalidCallsign {
                callsign: spec.callsign,
                role: if requires_tx { "transmitting" } else { "receive-only" },
            });
        }
        let ax25_address = Ax25Address::parse(&spec.callsign).ok();
        let aliases = if spec.aliases.is_empty() {
            DEFAULT_ALIASES.iter().map(|a| (*a).to_owned()).collect()
        } else {
            spec.aliases
        };
        Ok(Self {
            index,
            group,
            callsign: spec.callsign,
            ax25_address,
            kind: spec.kind,
            tx_ok: spec.tx_ok,
            telemetry_to_is: spec.telemetry_to_is,
            telemetry_to_rf: spec.telemetry_to_rf,
            aliases,
            sources: Vec::new(),
            counters: TrafficCounters::default(),
            transport: None,
        })
    }

    /// The APRS-IS pseudo-interface: index and group 0, never transmits,
    /// no telemetry.
    pub(crate) fn aprsis() -> Self {
        Self {
            index: InterfaceIndex(0),
            group: APRSIS_GROUP,
            callsign: APRSIS_CALLSIGN.to_owned(),
            ax25_address: None,
            kind: InterfaceKind::AprsIs,
            tx_ok: false,
            telemetry_to_is: false,
            telemetry_to_rf: false,
            aliases: Vec::new(),
            sources: Vec::new(),
            counters: TrafficCounters::default(),
            transport: None,
        }
    }

    /// Position in the registry.
    pub fn index(&self) -> InterfaceIndex {
        self.index
    }

    /// Igate group; 0 is APRS-IS.
    pub fn group(&self) -> u16 {
        self.group
    }

    /// Callsign as configured.
    pub fn callsign(&self) -> &str {
        &self.callsign
    }

    /// Encoded AX.25 form of the callsign; `None` for receive-only
    /// interfaces whose login does not fit an address field.
    pub fn ax25_address(&self) -> Option<&Ax25Address> {
        self.ax25_address.as_ref()
    }

    pub fn kind(&self) -> &InterfaceKind {
        &self.kind
    }

    /// Whether frames may be transmitted on this interface.
    pub fn tx_ok(&self) -> bool {
        self.tx_ok
    }

    /// Whether telemetry heard here may be passed to APRS-IS.
    pub fn telemetry_to_is(&self) -> bool {
        self.telemetry_to_is
    }

    /// Whether telemetry may be transmitted here.
    pub fn telemetry_to_rf(&self) -> bool {
        self.telemetry_to_rf
    }

    /// Digipeat aliases answered on this interface.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Case-insensitive alias match.
    pub fn is_alias(&self, callsign: &str) -> bool {
        self.aliases.iter().any(|a| a.eq_ignore_ascii_case(callsign))
    }

    /// Digipeater sources fed by this interface, in dispatch order.
    pub fn sources(&self) -> &[DigipeaterSource] {
        &self.sources
    }

    pub(crate) fn push_source(&mut self, source: DigipeaterSource) {
        self.sources.push(source);
    }

    /// Traffic counters, updated on receive and transmit.
    pub fn counters(&self) -> &TrafficCounters {
        &self.counters
    }

    /// Bind the byte sink frames are handed to.
    pub fn attach_transport(&mut self, transport: Rc<dyn Transport>) {
        self.transport = Some(transport);
    }

    fn transport(&self) -> Result<&dyn Transport, TransportError> {
        self.transport
            .as_deref()
            .ok_or_else(|| TransportError::NotAttached(self.callsign.clone()))
    }

    /// Send an AX.25 address header and frame body out of this interface.
    ///
    /// KISS links get the frame wrapped for this interface's TNC port. The
    /// null interface only accounts the frame; the APRS-IS interface has no
    /// radio side and ignores it.
    pub fn transmit(&self, address: &[u8], data: &[u8]) -> Result<(), TransportError> {
        let len = address.len() + data.len();
        if len == 0 {
            return Ok(());
        }

        match &self.kind {
            InterfaceKind::AprsIs => {
                tracing::debug!(
                    interface = %self.callsign,
                    len,
                    "radio transmit on APRS-IS interface ignored"
                );
                return Ok(());
            }
            InterfaceKind::Null => {}
            InterfaceKind::SerialKiss { port, .. } | InterfaceKind::TcpKiss { port, .. } => {
                let frame = [address, data].concat();
                self.transport()?.send(&kiss_frame(*port, &frame))?;
            }
            InterfaceKind::Ax25Device { .. } | InterfaceKind::Agwpe { .. } => {
                let frame = [address, data].concat();
                self.transport()?.send(&frame)?;
            }
        }

        self.counters.record_tx(len);
        tracing::trace!(interface = %self.callsign, len, "frame transmitted");
        Ok(())
    }
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interface")
            .field("index", &self.index)
            .field("group", &self.group)
            .field("callsign", &self.callsign)
            .field("kind", &self.kind)
            .field("tx_ok", &self.tx_ok)
            .field("sources", &self.sources.len())
            .field("transport", &self.transport.is_some())
            .finish()
    }
}
