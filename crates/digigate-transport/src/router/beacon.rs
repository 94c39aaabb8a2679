//! Locally originated beacon frames.

use digigate_core::address::Ax25Address;
use digigate_core::constants::{MAX_VIA, TNC2_INFO_SEP, TNC2_PATH_SEP, TNC2_SOURCE_SEP};
use digigate_core::error::AddressError;
use digigate_core::frame::header::AddressHeader;

use crate::error::BeaconError;
use crate::interface::InterfaceIndex;
use crate::router::dispatch::Gateway;
use crate::router::types::{RfDirection, RfLogRecord};
use crate::services::AprsParser;

/// Result of a beacon transmission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeaconOutcome {
    /// No interface, or the interface may not transmit.
    NotApplicable,
    /// Sent; the record reproduces what went on the air.
    Sent { rflog: RfLogRecord },
}

/// Parse a comma-separated via list. Empty tokens are rejected before the
/// field limit is checked for the token that follows.
fn parse_via_list(via: &str) -> Result<Vec<Ax25Address>, BeaconError> {
    let mut fields = Vec::new();
    for token in via.split(char::from(TNC2_PATH_SEP)) {
        if token.is_empty() {
            return Err(BeaconError::EmptyVia(via.to_owned()));
        }
        if fields.len() == MAX_VIA {
            return Err(AddressError::TooManyVia {
                max: MAX_VIA,
                actual: fields.len() + 1,
            }
            .into());
        }
        fields.push(Ax25Address::parse(token)?);
    }
    Ok(fields)
}

impl<P: AprsParser> Gateway<P> {
    /// Send a beacon out of `interface`.
    ///
    /// `payload` starts with the AX.25 control and PID bytes. The frame is
    /// registered with the transmitting digipeater's dupe store before it
    /// is sent, so the copy heard back from RF is not digipeated again.
    pub fn transmit_beacon(
        &mut self,
        interface: Option<InterfaceIndex>,
        src: &str,
        dest: &str,
        via: Option<&str>,
        payload: &[u8],
    ) -> Result<BeaconOutcome, BeaconError> {
        let Some(iface) = interface.and_then(|i| self.registry.get(i)) else {
            return Ok(BeaconOutcome::NotApplicable);
        };
        if !iface.tx_ok() {
            return Ok(BeaconOutcome::NotApplicable);
        }
        if payload.len() < 2 {
            return Err(BeaconError::PayloadTooShort(payload.len()));
        }

        let mut header = AddressHeader::new(Ax25Address::parse(dest)?, Ax25Address::parse(src)?);
        let mut address_text = format!("{src}{}{dest}", char::from(TNC2_SOURCE_SEP));
        if let Some(via) = via.filter(|v| !v.is_empty()) {
            for field in parse_via_list(via)? {
                header.push_via(field)?;
            }
            address_text.push(char::from(TNC2_PATH_SEP));
            address_text.push_str(via);
        }

        let body = &payload[2..];
        let index = iface.index();
        if let Some(digi) = self
            .digipeaters
            .iter_mut()
            .find(|d| d.transmitter() == index)
        {
            digi.dupes_mut().register(address_text.as_bytes(), body);
        }

        iface.transmit(&header.encode(), payload)?;

        let rflog = RfLogRecord {
            interface: iface.callsign().to_owned(),
            direction: RfDirection::Transmitted,
            text: format!(
                "{address_text}{}{}",
                char::from(TNC2_INFO_SEP),
                String::from_utf8_lossy(body)
            ),
        };
        tracing::debug!(beacon = %rflog, "beacon transmitted");
        Ok(BeaconOutcome::Sent { rflog })
    }
}
