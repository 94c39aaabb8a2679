//! Collaborator contracts consumed by the gateway core.
//!
//! The gateway never owns a filter engine, a history store or a radio
//! driver outright. It talks to them through these traits so that each can
//! be swapped or stubbed independently.

use digigate_core::aprs::{self, AprsMessage};
use digigate_core::packet::buffer::PacketBuffer;

use crate::error::TransportError;
use crate::history::HistoryEntry;

/// Outcome of a source filter chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterVerdict {
    Accept,
    Reject,
    Indifferent,
}

/// Per-station "last heard" store, indexed by interface group.
pub trait HistoryDb {
    /// Record the packet's originator as heard on the packet's source group
    /// at the packet's receive time. Returns `false` when the packet has no
    /// usable originator.
    fn insert_heard(&mut self, packet: &PacketBuffer) -> bool;

    /// Mark `callsign` as heard via APRS-IS (group 0) at `at`.
    fn mark_heard_via_internet(&mut self, callsign: &str, at: u64);

    /// Entry for `callsign`, case-insensitive.

    fn lookup(&self, callsign: &str) -> Option<&HistoryEntry>;
}

/// A source filter chain (accept/reject expressions).
pub trait SourceFilter {
    fn evaluate(&self, packet: &PacketBuffer, history: &dyn HistoryDb) -> FilterVerdict;
}

/// Duplicate-frame suppression store.
pub trait DupeCheck {
    /// Record a frame; returns `true` when it had not been seen before.
    fn register(&mut self, address: &[u8], payload: &[u8]) -> bool;

    fn is_duplicate(&self, address: &[u8], payload: &[u8]) -> bool;
}

/// APRS-meaning parser.
pub trait AprsParser {
    /// Fill in the packet's classification. Returns `true` when the packet
    /// was recognised as some APRS type.
    fn parse(&self, packet: &mut PacketBuffer, history: Option<&dyn HistoryDb>) -> bool;

    fn parse_message(&self, packet: &PacketBuffer) -> Option<AprsMessage>;
}

/// Byte sink of one radio or network link.
pub trait Transport {
    fn send(&self, frame: &[u8]) -> Result<(), TransportError>;
}

/// Parser backed by the classifier in `digigate-core`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicAprsParser;

impl AprsParser for BasicAprsParser {
    fn parse(&self, packet: &mut PacketBuffer, _history: Option<&dyn HistoryDb>) -> bool {
        packet.classify()
    }

    fn parse_message(&self, packet: &PacketBuffer) -> Option<AprsMessage> {
        aprs::parse_message(packet.aprs_info())
    }
}
