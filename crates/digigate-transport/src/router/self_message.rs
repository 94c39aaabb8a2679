//! Messages addressed to one of this station's own identities.

use digigate_core::constants::NAME_MAX;
use digigate_core::packet::buffer::PacketBuffer;
use digigate_core::packet::kind::PacketKind;

use crate::interface::InterfaceIndex;
use crate::router::constants::{APRSIS_ACK_PATH, APRSIS_LOG_NAME};
use crate::router::dispatch::Gateway;
use crate::router::types::{AprsIsLine, QType, RfDirection, RfLogRecord, RouterAction};
use crate::services::AprsParser;

/// Which identity a message was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfTarget {
    PrimaryIdentity,
    AprsIsLogin,
    /// A transmit-enabled interface's own callsign.
    Interface(InterfaceIndex),
}

/// How an acknowledgement was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    QueuedToAprsIs,
    /// Acknowledging over radio is not supported; the message came in on an
    /// RF interface and no ack was generated.
    RadioUnsupported,
}

/// Result of checking a packet for a message addressed to this station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfMessageOutcome {
    NotMessage,
    NotForUs,
    Unparseable,
    /// An `ack` or `rej` reply. Never acknowledged itself.
    AckOrReject,
    NoMessageId,
    Acknowledged(AckOutcome),
}

impl SelfMessageOutcome {
    /// Whether the message was recognized as ours and consumed.
    pub fn handled(self) -> bool {
        matches!(
            self,
            SelfMessageOutcome::AckOrReject
                | SelfMessageOutcome::NoMessageId
                | SelfMessageOutcome::Acknowledged(_)
        )
    }
}

impl<P: AprsParser> Gateway<P> {
    /// Resolve the message addressee against the station's identities.
    pub fn is_addressed_to_self(&self, packet: &PacketBuffer) -> Option<SelfTarget> {
        let dst = packet.dst_name()?;
        if dst == self.identity.mycall {
            return Some(SelfTarget::PrimaryIdentity);
        }
        if self.identity.aprsis_login.as_deref() == Some(dst) {
            return Some(SelfTarget::AprsIsLogin);
        }
        self.registry
            .find_by_callsign(dst)
            .filter(|iface| iface.tx_ok())
            .map(|iface| SelfTarget::Interface(iface.index()))
    }

    /// Handle a message addressed to this station, acknowledging it when it
    /// carries a message id. Generated lines are appended to `actions`.
    pub fn process_message_to_self(
        &self,
        srcif: InterfaceIndex,
        packet: &PacketBuffer,
        actions: &mut Vec<RouterAction>,
    ) -> SelfMessageOutcome {
        if !packet.kind().contains(PacketKind::MESSAGE) {
            return SelfMessageOutcome::NotMessage;
        }
        let Some(target) = self.is_addressed_to_self(packet) else {
            return SelfMessageOutcome::NotForUs;
        };
        let Some(message) = self.parser.parse_message(packet) else {
            return SelfMessageOutcome::Unparseable;
        };

        tracing::info!(packet = %packet.tnc2_text(), ?target, "message to self");

        if message.is_ack || message.is_rej {
            return SelfMessageOutcome::AckOrReject;
        }
        let Some(msgid) = message.msgid.as_deref() else {
            return SelfMessageOutcome::NoMessageId;
        };

        if srcif != self.registry.aprsis().index() {
            tracing::debug!(interface = %srcif, msgid, "not acknowledging message heard on radio");
            return SelfMessageOutcome::Acknowledged(AckOutcome::RadioUnsupported);
        }

        let dst = packet.dst_name().unwrap_or_default();
        let sender = sender_name(packet);
        let line = AprsIsLine {
            address: format!("{dst}>{APRSIS_ACK_PATH}"),
            qtype: QType::LocalGen,
            login: self.identity.aprsis_login.clone(),
            text: format!(":{sender:<width$}:ack{msgid}", width = NAME_MAX),
        };
        actions.push(RouterAction::RfLog(RfLogRecord {
            interface: APRSIS_LOG_NAME.to_owned(),
            direction: RfDirection::ToAprsIs,
            text: line.to_string(),
        }));
        actions.push(RouterAction::QueueAprsIs(line));
        SelfMessageOutcome::Acknowledged(AckOutcome::QueuedToAprsIs)
    }
}

/// The originator, cut to the width of a message addressee.
fn sender_name(packet: &PacketBuffer) -> &str {
    let src = packet.src_name().unwrap_or_else(|| {
        let address = packet.tnc2_address();
        let end = address.iter().position(|&b| b == b'>').unwrap_or(address.len());
        core::str::from_utf8(&address[..end]).unwrap_or_default()
    });
    match src.char_indices().nth(NAME_MAX) {
        Some((i, _)) => &src[..i],
        None => src,
    }
}
