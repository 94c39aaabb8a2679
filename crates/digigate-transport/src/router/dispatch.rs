//! Gateway state and the receive path for locally heard radio frames.

use digigate_core::aprs;
use digigate_core::constants::MIN_ADDRESS_HEADER;
use digigate_core::error::FrameError;
use digigate_core::frame::ReceivedFrame;
use digigate_core::framing::kiss::kiss_unframe;
use digigate_core::packet::buffer::PacketBuffer;
use digigate_core::packet::kind::PacketKind;

use crate::digipeater::{Digipeater, DigipeaterId, DigipeaterSource};
use crate::error::{GateError, RegistryError};
use crate::interface::{InterfaceIndex, InterfaceRegistry};
use crate::router::types::RouterAction;
use crate::services::{AprsParser, BasicAprsParser, FilterVerdict, HistoryDb};

/// Identities the station answers messages for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationIdentity {
    pub mycall: String,
    pub aprsis_login: Option<String>,
}

impl StationIdentity {
    /// Identity with no APRS-IS login.
    pub fn new(mycall: impl Into<String>) -> Self {
        Self {
            mycall: mycall.into(),
            aprsis_login: None,
        }
    }

    /// Login used on the APRS-IS connection; messages to it are also ours.
    pub fn with_aprsis_login(mut self, login: impl Into<String>) -> Self {
        self.aprsis_login = Some(login.into());
        self
    }
}

/// Central dispatcher: interfaces, digipeaters and the APRS parser.
pub struct Gateway<P: AprsParser = BasicAprsParser> {
    pub(crate) registry: InterfaceRegistry,
    pub(crate) digipeaters: Vec<Digipeater>,
    pub(crate) identity: StationIdentity,
    pub(crate) parser: P,
}

impl Gateway<BasicAprsParser> {
    /// Gateway with no digipeaters, using the built-in APRS classifier.
    pub fn new(identity: StationIdentity, registry: InterfaceRegistry) -> Self {
        Self::with_parser(identity, registry, BasicAprsParser)
    }
}

impl<P: AprsParser> Gateway<P> {
    /// Gateway with no digipeaters, using `parser` to classify packets.
    pub fn with_parser(identity: StationIdentity, registry: InterfaceRegistry, parser: P) -> Self {
        Self {
            registry,
            digipeaters: Vec::new(),
            identity,
            parser,
        }
    }

    pub fn identity(&self) -> &StationIdentity {
        &self.identity
    }

    pub fn registry(&self) -> &InterfaceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut InterfaceRegistry {
        &mut self.registry
    }

    /// Add a digipeater. Its transmitter must be a registered,
    /// transmit-enabled interface.
    pub fn add_digipeater(&mut self, digipeater: Digipeater) -> Result<DigipeaterId, RegistryError> {
        let tx = digipeater.transmitter();
        let iface = self
            .registry
            .get(tx)
            .ok_or(RegistryError::UnknownInterface(tx.0))?;
        if !iface.tx_ok() {
            return Err(RegistryError::NotTransmitter(iface.callsign().to_owned()));
        }
        let id = DigipeaterId(self.digipeaters.len());
        tracing::debug!(transmitter = %iface.callsign(), digipeater = id.0, "digipeater added");
        self.digipeaters.push(digipeater);
        Ok(id)
    }

    /// Attach a digipeater source to a receiving interface. Sources are
    /// served in attachment order.
    pub fn attach_source(
        &mut self,
        interface: InterfaceIndex,
        source: DigipeaterSource,
    ) -> Result<(), RegistryError> {
        let digi = source.digipeater();
        if digi.0 >= self.digipeaters.len() {
            return Err(RegistryError::UnknownDigipeater(digi.0));
        }
        self.registry.attach_source(interface, source)
    }

    /// Digipeater by id.
    pub fn digipeater(&self, id: DigipeaterId) -> Option<&Digipeater> {
        self.digipeaters.get(id.0)
    }

    pub fn digipeater_mut(&mut self, id: DigipeaterId) -> Option<&mut Digipeater> {
        self.digipeaters.get_mut(id.0)
    }

    /// The digipeater transmitting on `interface`, if any.
    pub fn digipeater_for_transmitter(&self, interface: InterfaceIndex) -> Option<DigipeaterId> {
        self.digipeaters
            .iter()
            .position(|d| d.transmitter() == interface)
            .map(DigipeaterId)
    }

    /// Digipeaters in the order they were added.
    pub fn digipeaters(&self) -> impl Iterator<Item = (DigipeaterId, &Digipeater)> {
        self.digipeaters
            .iter()
            .enumerate()
            .map(|(i, d)| (DigipeaterId(i), d))
    }

    /// Decode and dispatch a raw AX.25 frame delivered by a transport.
    pub fn receive_from_transport(
        &mut self,
        interface: InterfaceIndex,
        raw: &[u8],
        now: u64,
    ) -> Result<Vec<RouterAction>, GateError> {
        let iface = self
            .registry
            .get(interface)
            .ok_or(GateError::UnknownInterface(interface.0))?;
        iface.counters().record_rx(raw.len());
        let frame = ReceivedFrame::from_ax25(raw)?;
        self.receive_ax25(interface, &frame, now)
    }

    /// Unwrap a KISS frame read from a multiplexed link and dispatch it to
    /// the interface bound to its TNC port. Non-data frames are ignored.
    pub fn receive_kiss(
        &mut self,
        link: &str,
        framed: &[u8],
        now: u64,
    ) -> Result<Vec<RouterAction>, GateError> {
        let kiss = kiss_unframe(framed)?;
        if !kiss.is_data() {
            tracing::trace!(link, command = kiss.command, "ignoring KISS control frame");
            return Ok(Vec::new());
        }
        let interface = self
            .registry
            .find_by_kiss_port(link, kiss.port)
            .map(|i| i.index())
            .ok_or_else(|| GateError::UnknownKissPort {
                link: link.to_owned(),
                port: kiss.port,
            })?;
        self.receive_from_transport(interface, &kiss.data, now)
    }

    /// Dispatch a radio frame heard on `interface` to every digipeater
    /// source attached to it.
    ///
    /// Each source gets its own packet buffer, so one oversized or filtered
    /// copy never affects the others.
    pub fn receive_ax25(
        &mut self,
        interface: InterfaceIndex,
        frame: &ReceivedFrame,
        now: u64,
    ) -> Result<Vec<RouterAction>, GateError> {
        let rx_if = self
            .registry
            .get(interface)
            .ok_or(GateError::UnknownInterface(interface.0))?;
        let mut actions = Vec::new();

        if rx_if.sources().is_empty() {
            if !frame.is_aprs {
                return Ok(actions);
            }
            // Keep heard state current for the digipeater on this interface.
            let Some(digi) = self
                .digipeaters
                .iter_mut()
                .find(|d| d.transmitter() == interface)
            else {
                return Ok(actions);
            };
            let mut pb = match PacketBuffer::new(frame, frame.is_aprs, now) {
                Ok(pb) => pb,
                Err(e) => {
                    tracing::warn!(interface = %rx_if.callsign(), error = %e, "dropping frame");
                    return Ok(actions);
                }
            };
            pb.set_source_if_group(rx_if.group());
            self.parser.parse(&mut pb, Some(digi.history()));
            digi.history_mut().insert_heard(&pb);
            return Ok(actions);
        }

        if frame.ax25_addr_len < MIN_ADDRESS_HEADER {
            return Err(FrameError::ShortAddressHeader {
                len: frame.ax25_addr_len,
            }
            .into());
        }

        let digi_like_aprs = frame.is_aprs || frame.ui_pid.is_some();

        for source in rx_if.sources() {
            let id = source.digipeater();
            let Some(digi) = self.digipeaters.get_mut(id.0) else {
                tracing::warn!(digipeater = id.0, "source refers to unknown digipeater");
                continue;
            };
            let mut pb = match PacketBuffer::new(frame, digi_like_aprs, now) {
                Ok(pb) => pb,
                Err(e) => {
                    tracing::warn!(interface = %rx_if.callsign(), error = %e, "dropping frame for source");
                    continue;
                }
            };
            pb.set_source_if_group(rx_if.group());

            if frame.is_aprs {
                self.parser.parse(&mut pb, Some(digi.history()));
            }

            let verdict = source
                .filters()
                .map_or(FilterVerdict::Indifferent, |f| f.evaluate(&pb, digi.history()));
            if verdict == FilterVerdict::Reject {
                tracing::debug!(
                    interface = %rx_if.callsign(),
                    packet = %pb.tnc2_text(),
                    "source filter rejected frame"
                );
                continue;
            }

            if frame.is_aprs {
                if pb.kind().contains(PacketKind::THIRDPARTY) {
                    record_third_party(digi.history_mut(), &pb);
                } else {
                    digi.history_mut().insert_heard(&pb);
                }
            }

            actions.push(RouterAction::Digipeat {
                digipeater: id,
                transmitter: digi.transmitter(),
                received_on: interface,
                packet: pb,
            });
        }

        Ok(actions)
    }
}

/// Record a third-party frame heard on RF.
///
/// Only frames whose encapsulated header shows Internet origin are recorded:
/// the inner source is marked as heard on RF and via APRS-IS. Plain
/// third-party relays leave the history untouched.
fn record_third_party(history: &mut dyn HistoryDb, pb: &PacketBuffer) {
    if !aprs::is_gated_from_internet(pb.tnc2_info()) {
        return;
    }
    if !history.insert_heard(pb) {
        return;
    }
    if let Some(callsign) = pb.src_name() {
        history.mark_heard_via_internet(callsign, pb.received_at());
        tracing::trace!(callsign, "station heard via internet gateway");
    }
}
