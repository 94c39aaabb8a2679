//! Router types.

use std::fmt;

use digigate_core::packet::buffer::PacketBuffer;

use crate::digipeater::DigipeaterId;
use crate::interface::InterfaceIndex;

/// Priority tag of a line queued to APRS-IS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QType {
    /// Generated locally by this station.
    LocalGen,
}

/// A text line for the APRS-IS uplink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AprsIsLine {
    /// `SRC>DEST,PATH` address part.
    pub address: String,
    pub qtype: QType,
    pub login: Option<String>,
    /// Information field, without the leading `:` separator.
    pub text: String,
}

impl fmt::Display for AprsIsLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.text)
    }
}

/// Direction code of a raw-frame log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RfDirection {
    Received,
    Transmitted,
    /// Sent to APRS-IS.
    ToAprsIs,
}

impl RfDirection {
    /// One-letter code written to the raw-frame log.
    pub fn code(self) -> char {
        match self {
            RfDirection::Received => 'R',
            RfDirection::Transmitted => 'T',
            RfDirection::ToAprsIs => 't',
        }
    }
}

/// One line of the raw-frame log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfLogRecord {
    pub interface: String,
    pub direction: RfDirection,
    pub text: String,
}

impl fmt::Display for RfLogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.interface, self.direction.code(), self.text)
    }
}

/// Action returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterAction {
    /// Hand a packet to a digipeater for transmission on its interface.
    Digipeat {
        digipeater: DigipeaterId,
        transmitter: InterfaceIndex,
        received_on: InterfaceIndex,
        packet: PacketBuffer,
    },
    /// Queue a line to the APRS-IS uplink.
    QueueAprsIs(AprsIsLine),
    /// Append a record to the raw-frame log.
    RfLog(RfLogRecord),
}
