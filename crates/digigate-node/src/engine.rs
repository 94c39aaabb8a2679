//! Carries out the actions returned by the gateway.
//!
//! Frames gated from APRS-IS are transmitted straight away on their
//! digipeater's transmitter. Frames heard on radio are handed to the
//! digipeater proper, which rewrites their via path; that engine is not
//! part of this node, so such frames are only logged here.

use std::time::{SystemTime, UNIX_EPOCH};

use tokio::io::{AsyncWrite, AsyncWriteExt};

use digigate_core::constants::{CONTROL_UI, PID_NO_LAYER3};
use digigate_core::frame::tnc2::split_tnc2;
use digigate_core::packet::buffer::PacketBuffer;
use digigate_transport::interface::APRSIS_GROUP;
use digigate_transport::router::{AprsIsLine, BeaconOutcome, DEFAULT_GATEWAY_TYPE, RfDirection, RfLogRecord};
use digigate_transport::{DigipeaterId, Gateway, InterfaceIndex, RouterAction};

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::gateway_init::build_gateway;

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// A configured beacon, resolved against the registry.
#[derive(Debug, Clone)]
struct Beacon {
    interface: InterfaceIndex,
    source: String,
    dest: String,
    via: Option<String>,
    /// Control and PID bytes followed by the information field.
    frame_body: Vec<u8>,
}

/// A gateway built from configuration plus its resolved beacons.
pub struct Engine {
    gateway: Gateway,
    beacons: Vec<Beacon>,
}

impl Engine {
    /// Build the gateway and resolve the beacons of `config`.
    pub fn new(config: &NodeConfig) -> Result<Self, NodeError> {
        let gateway = build_gateway(config)?;
        let beacons = config
            .beacons
            .iter()
            .map(|b| {
                let iface = gateway
                    .registry()
                    .find_by_callsign(&b.interface)
                    .ok_or_else(|| NodeError::Config(format!("unknown beacon interface {}", b.interface)))?;
                let mut frame_body = vec![CONTROL_UI, PID_NO_LAYER3];
                frame_body.extend_from_slice(b.payload.as_bytes());
                Ok(Beacon {
                    interface: iface.index(),
                    source: b.source.clone().unwrap_or_else(|| iface.callsign().to_owned()),
                    dest: b.dest.clone(),
                    via: b.via.clone(),
                    frame_body,
                })
            })
            .collect::<Result<Vec<_>, NodeError>>()?;
        Ok(Self { gateway, beacons })
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Process one line of the APRS-IS feed. Returns the lines to send back
    /// to APRS-IS.
    pub fn handle_aprsis_line(&mut self, line: &str, now: u64) -> Vec<AprsIsLine> {
        let line = line.trim_end_matches(['\r', '\n']);
        // Server comments and keepalives.
        if line.is_empty() || line.starts_with('#') {
            return Vec::new();
        }
        let tnc2 = match split_tnc2(line.as_bytes()) {
            Ok(tnc2) => tnc2,
            Err(e) => {
                tracing::warn!(line, error = %e, "unparseable APRS-IS line");
                return Vec::new();
            }
        };
        let aprsis = self.gateway.registry().aprsis().index();
        match self.gateway.receive_thirdparty(
            aprsis,
            &tnc2.heads,
            DEFAULT_GATEWAY_TYPE,
            tnc2.payload,
            now,
        ) {
            Ok(actions) => self.apply(actions),
            Err(e) => {
                tracing::warn!(line, error = %e, "APRS-IS line dropped");
                Vec::new()
            }
        }
    }

    /// Process a raw AX.25 frame heard on a radio interface.
    pub fn handle_rf_frame(&mut self, interface: InterfaceIndex, raw: &[u8], now: u64) -> Vec<AprsIsLine> {
        match self.gateway.receive_from_transport(interface, raw, now) {
            Ok(actions) => self.apply(actions),
            Err(e) => {
                tracing::warn!(%interface, error = %e, "radio frame dropped");
                Vec::new()
            }
        }
    }

    /// Send every configured beacon once.
    pub fn send_beacons(&mut self) -> Vec<RfLogRecord> {
        let mut sent = Vec::new();
        for beacon in &self.beacons {
            match self.gateway.transmit_beacon(
                Some(beacon.interface),
                &beacon.source,
                &beacon.dest,
                beacon.via.as_deref(),
                &beacon.frame_body,
            ) {
                Ok(BeaconOutcome::Sent { rflog }) => {
                    tracing::info!(rflog = %rflog, "beacon");
                    sent.push(rflog);
                }
                Ok(BeaconOutcome::NotApplicable) => {
                    tracing::debug!(interface = %beacon.interface, "beacon interface cannot transmit");
                }
                Err(e) => tracing::warn!(interface = %beacon.interface, error = %e, "beacon failed"),
            }
        }
        sent
    }

    fn apply(&mut self, actions: Vec<RouterAction>) -> Vec<AprsIsLine> {
        let mut uplink = Vec::new();
        for action in actions {
            match action {
                RouterAction::Digipeat {
                    digipeater,
                    transmitter,
                    received_on,
                    packet,
                } => {
                    if packet.source_if_group() == APRSIS_GROUP {
                        self.transmit_gated(digipeater, transmitter, &packet);
                    } else {
                        tracing::debug!(
                            %received_on,
                            %transmitter,
                            packet = %packet.tnc2_text(),
                            "digipeat candidate"
                        );
                    }
                }
                RouterAction::QueueAprsIs(line) => uplink.push(line),
                RouterAction::RfLog(record) => tracing::info!(rflog = %record, "rflog"),
            }
        }
        uplink
    }

    fn transmit_gated(&mut self, digipeater: DigipeaterId, transmitter: InterfaceIndex, packet: &PacketBuffer) {
        let Some(digi) = self.gateway.digipeater_mut(digipeater) else {
            return;
        };
        if !digi.dupes_mut().register(packet.tnc2_address(), packet.tnc2_info()) {
            tracing::debug!(packet = %packet.tnc2_text(), "gated frame already sent");
            return;
        }
        let Some(iface) = self.gateway.registry().get(transmitter) else {
            return;
        };
        match iface.transmit(packet.ax25_address(), packet.ax25_body()) {
            Ok(()) => tracing::info!(
                rflog = %RfLogRecord {
                    interface: iface.callsign().to_owned(),
                    direction: RfDirection::Transmitted,
                    text: packet.tnc2_text().into_owned(),
                },
                "gated to RF"
            ),
            Err(e) => tracing::warn!(interface = %iface.callsign(), error = %e, "gated transmit failed"),
        }
    }
}

/// Write APRS-IS lines, one per line, and flush.
pub async fn write_uplink<W>(writer: &mut W, lines: &[AprsIsLine]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    for line in lines {
        writer.write_all(line.to_string().as_bytes()).await?;
        writer.write_all(b"\r\n").await?;
    }
    writer.flush().await
}
