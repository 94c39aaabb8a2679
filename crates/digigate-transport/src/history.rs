//! In-memory station history.
//!
//! Each entry remembers, per interface group, when the station was last
//! heard. Group 0 is the APRS-IS side, so "heard on group 0" means "heard
//! via the Internet".

use std::collections::HashMap;

use digigate_core::packet::buffer::PacketBuffer;

use crate::interface::{APRSIS_GROUP, MAX_IF_GROUP};
use crate::services::HistoryDb;

/// Last-heard times of one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    callsign: String,
    last_heard: [Option<u64>; MAX_IF_GROUP as usize],
    packets: u64,
}

impl HistoryEntry {
    /// Entry never heard on any group.
    pub fn new(callsign: impl Into<String>) -> Self {
        Self {
            callsign: callsign.into(),
            last_heard: [None; MAX_IF_GROUP as usize],
            packets: 0,
        }
    }

    pub fn callsign(&self) -> &str {
        &self.callsign
    }

    /// Packets recorded for this station.
    pub fn packets(&self) -> u64 {
        self.packets
    }

    /// Last time heard on `group`, if ever.
    #[must_use]
    pub fn last_heard(&self, group: u16) -> Option<u64> {
        self.last_heard.get(usize::from(group)).copied().flatten()
    }

    /// Record a hearing on `group`. Groups beyond the table are ignored.
    pub fn mark_heard(&mut self, group: u16, at: u64) {
        if let Some(slot) = self.last_heard.get_mut(usize::from(group)) {
            *slot = Some(at);
        }
    }

    /// Heard on `group` strictly after `since`.
    #[must_use]
    pub fn heard_since(&self, group: u16, since: u64) -> bool {
        self.last_heard(group).is_some_and(|t| t > since)
    }
}

/// History store keyed by uppercase callsign.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: HashMap<String, HistoryEntry>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Record a hearing directly, without a packet.
    pub fn record(&mut self, callsign: &str, group: u16, at: u64) -> &mut HistoryEntry {
        let entry = self
            .entries
            .entry(callsign.to_ascii_uppercase())
            .or_insert_with(|| HistoryEntry::new(callsign.to_ascii_uppercase()));
        entry.mark_heard(group, at);
        entry.packets += 1;
        entry
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn originator(packet: &PacketBuffer) -> Option<&str> {
    packet.src_name().or_else(|| {
        let address = std::str::from_utf8(packet.tnc2_address()).ok()?;
        address.split_once('>').map(|(src, _)| src)
    })
}

impl HistoryDb for MemoryHistory {
    fn insert_heard(&mut self, packet: &PacketBuffer) -> bool {
        let Some(callsign) = originator(packet).map(|c| c.trim_end_matches('*')) else {
            return false;
        };
        if callsign.is_empty() {
            return false;
        }
        self.record(callsign, packet.source_if_group(), packet.received_at());
        true
    }

    fn mark_heard_via_internet(&mut self, callsign: &str, at: u64) {
        let key = callsign.to_ascii_uppercase();
        self.entries
            .entry(key.clone())
            .or_insert_with(|| HistoryEntry::new(key))
            .mark_heard(APRSIS_GROUP, at);
    }

    fn lookup(&self, callsign: &str) -> Option<&HistoryEntry> {
        self.entries.get(&callsign.to_ascii_uppercase())
    }
}
