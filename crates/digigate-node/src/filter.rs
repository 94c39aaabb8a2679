//! Originator-list source filter.
//!
//! A small stand-in for a full filter-expression engine: packets whose
//! originator is on the reject list are rejected, those on the accept list
//! are accepted, and everything else is left to the default policy.

use digigate_core::packet::buffer::PacketBuffer;
use digigate_transport::{FilterVerdict, HistoryDb, SourceFilter};

use crate::config::FilterEntry;

/// Accept and reject lists of originator callsigns, case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct CallsignFilter {
    accept: Vec<String>,
    reject: Vec<String>,
}

impl CallsignFilter {
    /// Filter from accept and reject lists.
    pub fn new<I, S>(accept: I, reject: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let upper = |list: I| {
            list.into_iter()
                .map(|s| s.as_ref().to_ascii_uppercase())
                .collect::<Vec<_>>()
        };
        Self {
            accept: upper(accept),
            reject: upper(reject),
        }
    }
}

impl From<&FilterEntry> for CallsignFilter {
    fn from(entry: &FilterEntry) -> Self {
        Self::new(&entry.accept, &entry.reject)
    }
}

/// Originator of a packet: the classified source, else the TNC2 source.
fn originator(packet: &PacketBuffer) -> Option<String> {
    if let Some(src) = packet.src_name() {
        return Some(src.to_ascii_uppercase());
    }
    let address = std::str::from_utf8(packet.tnc2_address()).ok()?;
    let (src, _) = address.split_once('>')?;
    Some(src.to_ascii_uppercase())
}

impl SourceFilter for CallsignFilter {
    fn evaluate(&self, packet: &PacketBuffer, _history: &dyn HistoryDb) -> FilterVerdict {
        let Some(src) = originator(packet) else {
            return FilterVerdict::Indifferent;
        };
        if self.reject.contains(&src) {
            FilterVerdict::Reject
        } else if self.accept.contains(&src) {
            FilterVerdict::Accept
        } else {
            FilterVerdict::Indifferent
        }
    }
}
