//! Tx-IGate: gating frames that arrive from APRS-IS onto RF.
//!
//! An APRS-IS line is first rebuilt as a plain `FROM>TO:payload` frame so
//! that messages to this station can be caught. Everything else is
//! rewrapped per digipeater source as a third-party frame sent by that
//! source's transmitter:
//!
//! ```text
//! TXCALL>APRS[,VIA]:}FROM>TO,GWTYPE,TXCALL*:payload
//! ```
//!
//! The TNC2 copy used for filtering keeps the original APRS-IS path
//! instead of the via substitution.

use digigate_core::address::Ax25Address;
use digigate_core::aprs::recipient_name;
use digigate_core::constants::{
    APRS_DESTINATION, CONTROL_UI, DTI_THIRDPARTY, FRAME_BUILD_MAX, PID_NO_LAYER3, TNC2_INFO_SEP,
    TNC2_PATH_SEP, TNC2_REPEATED_MARK, TNC2_SOURCE_SEP,
};
use digigate_core::error::BufferError;
use digigate_core::frame::ReceivedFrame;
use digigate_core::frame::header::AddressHeader;
use digigate_core::packet::buffer::PacketBuffer;
use digigate_core::packet::builder::FrameBuilder;
use digigate_core::packet::kind::PacketKind;

use crate::digipeater::{Digipeater, DigipeaterSource};
use crate::error::GateError;
use crate::gate_decision::{GateInputs, decide_gate};
use crate::interface::{APRSIS_GROUP, Interface, InterfaceIndex, InterfaceRegistry};
use crate::router::dispatch::Gateway;
use crate::router::types::RouterAction;
use crate::services::{AprsParser, FilterVerdict};

/// Both wire forms of one frame, ready for a [`PacketBuffer`].
struct BuiltFrame {
    ax25: Vec<u8>,
    ax25_addr_len: usize,
    tnc2: Vec<u8>,
    tnc2_addr_len: usize,
}

impl BuiltFrame {
    fn into_packet(self, now: u64) -> Result<PacketBuffer, BufferError> {
        let frame = ReceivedFrame {
            ax25: self.ax25,
            ax25_addr_len: self.ax25_addr_len,
            tnc2: self.tnc2,
            tnc2_addr_len: self.tnc2_addr_len,
            is_aprs: true,
            ui_pid: Some(PID_NO_LAYER3),
        };
        let mut pb = PacketBuffer::new(&frame, true, now)?;
        pb.set_source_if_group(APRSIS_GROUP);
        Ok(pb)
    }
}

fn push_ui_control(b: &mut FrameBuilder) -> Result<(), BufferError> {
    b.push(CONTROL_UI)?;
    b.push(PID_NO_LAYER3)
}

/// `FROM>TO:payload`, the frame as its originator sent it, minus the path.
fn canonical_frame(from: &str, to: &str, payload: &[u8]) -> Result<BuiltFrame, BufferError> {
    let header = AddressHeader::new(Ax25Address::relaxed(to), Ax25Address::relaxed(from));
    let mut ax25 = FrameBuilder::with_limit(FRAME_BUILD_MAX);
    ax25.extend(&header.encode())?;
    push_ui_control(&mut ax25)?;
    ax25.extend(payload)?;

    let mut tnc2 = FrameBuilder::with_limit(FRAME_BUILD_MAX);
    tnc2.extend_str(from)?;
    tnc2.push(TNC2_SOURCE_SEP)?;
    tnc2.extend_str(to)?;
    let tnc2_addr_len = tnc2.len();
    tnc2.push(TNC2_INFO_SEP)?;
    tnc2.extend(payload)?;

    Ok(BuiltFrame {
        ax25: ax25.into_vec(),
        ax25_addr_len: header.encoded_len(),
        tnc2: tnc2.into_vec(),
        tnc2_addr_len,
    })
}

/// `}FROM>TO,GWTYPE,TXCALL*:`
fn push_thirdparty_prefix(
    b: &mut FrameBuilder,
    heads: &[&str],
    gateway_type: &str,
    tx_callsign: &str,
) -> Result<(), BufferError> {
    b.push(DTI_THIRDPARTY)?;
    b.extend_str(heads[0])?;
    b.push(TNC2_SOURCE_SEP)?;
    b.extend_str(heads[1])?;
    b.push(TNC2_PATH_SEP)?;
    b.extend_str(gateway_type)?;
    b.push(TNC2_PATH_SEP)?;
    b.extend_str(tx_callsign)?;
    b.push(TNC2_REPEATED_MARK)?;
    b.push(TNC2_INFO_SEP)
}

fn gated_frame(
    heads: &[&str],
    gateway_type: &str,
    payload: &[u8],
    tx_if: &Interface,
    tx_address: Ax25Address,
    via: Option<&Ax25Address>,
) -> Result<BuiltFrame, GateError> {
    let mut header = AddressHeader::new(Ax25Address::new(APRS_DESTINATION), tx_address);
    if let Some(via) = via {
        header.push_via(*via)?;
    }

    let mut ax25 = FrameBuilder::with_limit(FRAME_BUILD_MAX);
    ax25.extend(&header.encode())?;
    push_ui_control(&mut ax25)?;
    push_thirdparty_prefix(&mut ax25, heads, gateway_type, tx_if.callsign())?;
    ax25.extend(payload)?;

    let mut tnc2 = FrameBuilder::with_limit(FRAME_BUILD_MAX);
    tnc2.extend_str(heads[0])?;
    tnc2.push(TNC2_SOURCE_SEP)?;
    tnc2.extend_str(heads[1])?;
    for head in &heads[2..] {
        tnc2.push(TNC2_PATH_SEP)?;
        tnc2.extend_str(head)?;
    }
    let tnc2_addr_len = tnc2.len();
    tnc2.push(TNC2_INFO_SEP)?;
    push_thirdparty_prefix(&mut tnc2, heads, gateway_type, tx_if.callsign())?;
    tnc2.extend(payload)?;

    Ok(BuiltFrame {
        ax25: ax25.into_vec(),
        ax25_addr_len: header.encoded_len(),
        tnc2: tnc2.into_vec(),
        tnc2_addr_len,
    })
}

/// One APRS-IS frame on its way through the per-source gates.
struct ThirdParty<'a> {
    received_on: InterfaceIndex,
    heads: &'a [&'a str],
    gateway_type: &'a str,
    payload: &'a [u8],
    /// Classification of the canonical frame.
    kind: PacketKind,
    now: u64,
}

impl<P: AprsParser> Gateway<P> {
    /// Offer a frame received from APRS-IS to the digipeaters fed by
    /// `interface`.
    ///
    /// `heads` is the APRS-IS address split at `>` and `,`: originator,
    /// destination, then the path. `gateway_type` is the path token put
    /// after the destination in the third-party header, normally `TCPIP`.
    pub fn receive_thirdparty(
        &mut self,
        interface: InterfaceIndex,
        heads: &[&str],
        gateway_type: &str,
        payload: &[u8],
        now: u64,
    ) -> Result<Vec<RouterAction>, GateError> {
        if self.registry.get(interface).is_none() {
            return Err(GateError::UnknownInterface(interface.0));
        }
        if heads.len() < 2 {
            return Err(GateError::IncompleteHeads(heads.len()));
        }
        let mut actions = Vec::new();

        let mut canonical = canonical_frame(heads[0], heads[1], payload)?.into_packet(now)?;
        self.parser.parse(&mut canonical, None);
        let kind = canonical.kind();

        let outcome = self.process_message_to_self(interface, &canonical, &mut actions);
        drop(canonical);
        if outcome.handled() {
            tracing::debug!(from = heads[0], ?outcome, "APRS-IS message to self consumed");
            return Ok(actions);
        }

        let frame = ThirdParty {
            received_on: interface,
            heads,
            gateway_type,
            payload,
            kind,
            now,
        };
        let Self {
            registry,
            digipeaters,
            parser,
            ..
        } = self;
        let Some(rx_if) = registry.get(interface) else {
            return Ok(actions);
        };
        for source in rx_if.sources() {
            if let Some(action) = gate_for_source(registry, digipeaters, parser, source, &frame) {
                actions.push(action);
            }
        }
        Ok(actions)
    }
}

fn gate_for_source<P: AprsParser>(
    registry: &InterfaceRegistry,
    digipeaters: &mut [Digipeater],
    parser: &P,
    source: &DigipeaterSource,
    frame: &ThirdParty<'_>,
) -> Option<RouterAction> {
    let id = source.digipeater();
    let digi = digipeaters.get_mut(id.0)?;
    let tx_index = digi.transmitter();
    let Some(tx_if) = registry.get(tx_index) else {
        tracing::warn!(transmitter = %tx_index, "digipeater transmitter not registered");
        return None;
    };
    let Some(tx_address) = tx_if.ax25_address().copied() else {
        tracing::warn!(transmitter = %tx_if.callsign(), "transmitter has no AX.25 address");
        return None;
    };

    let via = source.gated_via(frame.kind.contains(PacketKind::MESSAGE));
    let built = gated_frame(
        frame.heads,
        frame.gateway_type,
        frame.payload,
        tx_if,
        tx_address,
        via,
    );
    let mut pb = match built.and_then(|b| b.into_packet(frame.now).map_err(GateError::from)) {
        Ok(pb) => pb,
        Err(e) => {
            tracing::warn!(transmitter = %tx_if.callsign(), error = %e, "gated frame does not fit");
            return None;
        }
    };
    parser.parse(&mut pb, Some(digi.history()));

    let kind = if frame.kind.is_empty() {
        pb.kind()
    } else {
        frame.kind
    };

    let verdict = match source.filters() {
        Some(filters) => {
            digi.history_mut().insert_heard(&pb);
            filters.evaluate(&pb, digi.history())
        }
        None => FilterVerdict::Indifferent,
    };

    let decision = {
        let history = digi.history();
        let recipient = pb
            .dst_name()
            .and_then(|dst| history.lookup(recipient_name(dst)));
        decide_gate(&GateInputs {
            kind,
            has_recipient: pb.dst_name().is_some(),
            verdict,
            recipient,
            sender: history.lookup(frame.heads[0]),
            tx_group: tx_if.group(),
            now: frame.now,
        })
    };

    digi.history_mut().insert_heard(&pb);

    if !decision.is_forward() {
        tracing::debug!(
            transmitter = %tx_if.callsign(),
            packet = %pb.tnc2_text(),
            ?decision,
            "not gating to RF"
        );
        return None;
    }
    tracing::debug!(transmitter = %tx_if.callsign(), ?decision, "gating to RF");
    Some(RouterAction::Digipeat {
        digipeater: id,
        transmitter: tx_index,
        received_on: frame.received_on,
        packet: pb,
    })
}
