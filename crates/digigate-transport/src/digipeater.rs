//! Digipeaters and the sources that feed them.
//!
//! A digipeater transmits on exactly one interface and owns the history and
//! duplicate stores used for that transmitter. Each interface that feeds a
//! digipeater holds a [`DigipeaterSource`] describing how its traffic is
//! filtered and which via path gated frames get.

use std::fmt;

use digigate_core::address::Ax25Address;

use crate::dedup::DupeStore;
use crate::history::MemoryHistory;
use crate::interface::InterfaceIndex;
use crate::services::{DupeCheck, HistoryDb, SourceFilter};

/// Position of a digipeater in the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DigipeaterId(pub usize);

/// A transmitting interface together with its history and dupe stores.
pub struct Digipeater {
    transmitter: InterfaceIndex,
    history: Box<dyn HistoryDb>,
    dupes: Box<dyn DupeCheck>,
}

impl Digipeater {
    /// Digipeater transmitting on `transmitter` with the given collaborators.
    pub fn new(
        transmitter: InterfaceIndex,
        history: Box<dyn HistoryDb>,
        dupes: Box<dyn DupeCheck>,
    ) -> Self {
        Self {
            transmitter,
            history,
            dupes,
        }
    }

    /// Digipeater backed by the in-memory history and duplicate stores.
    pub fn with_memory_stores(transmitter: InterfaceIndex) -> Self {
        Self::new(
            transmitter,
            Box::new(MemoryHistory::new()),
            Box::new(DupeStore::new()),
        )
    }

    /// Interface this digipeater transmits on.
    pub fn transmitter(&self) -> InterfaceIndex {
        self.transmitter
    }

    pub fn history(&self) -> &dyn HistoryDb {
        self.history.as_ref()
    }

    pub fn history_mut(&mut self) -> &mut dyn HistoryDb {
        self.history.as_mut()
    }

    pub fn dupes(&self) -> &dyn DupeCheck {
        self.dupes.as_ref()
    }

    pub fn dupes_mut(&mut self) -> &mut dyn DupeCheck {
        self.dupes.as_mut()
    }
}

impl fmt::Debug for Digipeater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Digipeater")
            .field("transmitter", &self.transmitter)
            .finish_non_exhaustive()
    }
}

/// Binding of one receiving interface to a digipeater.
pub struct DigipeaterSource {
    digipeater: DigipeaterId,
    filters: Option<Box<dyn SourceFilter>>,
    via_path: Option<Ax25Address>,
    msg_via_path: Option<Ax25Address>,
}

impl DigipeaterSource {
    /// Source with no filter and no via paths.
    pub fn new(digipeater: DigipeaterId) -> Self {
        Self {
            digipeater,
            filters: None,
            via_path: None,
            msg_via_path: None,
        }
    }

    /// Evaluate `filter` before accepting frames from this source.
    pub fn with_filter(mut self, filter: Box<dyn SourceFilter>) -> Self {
        self.filters = Some(filter);
        self
    }

    /// Via used on frames gated through this source.
    pub fn with_via_path(mut self, via: Ax25Address) -> Self {
        self.via_path = Some(via);
        self
    }

    /// Via used instead of the ordinary one for gated messages.
    pub fn with_msg_via_path(mut self, via: Ax25Address) -> Self {
        self.msg_via_path = Some(via);
        self
    }

    /// Parent digipeater.
    pub fn digipeater(&self) -> DigipeaterId {
        self.digipeater
    }

    pub fn filters(&self) -> Option<&dyn SourceFilter> {
        self.filters.as_deref()
    }

    pub fn via_path(&self) -> Option<&Ax25Address> {
        self.via_path.as_ref()
    }

    pub fn msg_via_path(&self) -> Option<&Ax25Address> {
        self.msg_via_path.as_ref()
    }

    /// Via field for a gated frame: the message path for messages when one
    /// is configured, otherwise the ordinary path.
    pub fn gated_via(&self, is_message: bool) -> Option<&Ax25Address> {
        match (is_message, self.msg_via_path.as_ref()) {
            (true, Some(msg_via)) => Some(msg_via),
            _ => self.via_path.as_ref(),
        }
    }
}

impl fmt::Debug for DigipeaterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigipeaterSource")
            .field("digipeater", &self.digipeater)
            .field("filters", &self.filters.is_some())
            .field("via_path", &self.via_path)
            .field("msg_via_path", &self.msg_via_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gated_via_selection() {
        let wide = Ax25Address::parse("WIDE1-1").unwrap();
        let msg = Ax25Address::parse("WIDE2-2").unwrap();

        let plain = DigipeaterSource::new(DigipeaterId(0));
        assert_eq!(plain.gated_via(true), None);

        let only_via = DigipeaterSource::new(DigipeaterId(0)).with_via_path(wide);
        assert_eq!(only_via.gated_via(true), Some(&wide));
        assert_eq!(only_via.gated_via(false), Some(&wide));

        let both = DigipeaterSource::new(DigipeaterId(0))
            .with_via_path(wide)
            .with_msg_via_path(msg);
        assert_eq!(both.gated_via(true), Some(&msg));
        assert_eq!(both.gated_via(false), Some(&wide));
    }

    #[test]
    fn memory_digipeater_starts_empty() {
        let digi = Digipeater::with_memory_stores(InterfaceIndex(1));
        assert_eq!(digi.transmitter(), InterfaceIndex(1));
        assert!(digi.history().lookup("N0CALL").is_none());
        assert!(!digi.dupes().is_duplicate(b"N0CALL>APRS", b"x"));
    }
}
