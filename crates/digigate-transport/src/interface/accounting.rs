//! Per-interface traffic counters.

use std::cell::Cell;

/// Link overhead added to every transmitted frame (flags, FCS, TXDelay
/// approximation).
pub const TX_OVERHEAD: u64 = 10;

/// Point-in-time copy of an interface's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficSnapshot {
    pub rx_frames: u64,
    pub rx_bytes: u64,
    pub tx_frames: u64,
    pub tx_bytes: u64,
}

/// Interior-mutable counters, updated from `&Interface` on the send and
/// receive paths.
#[derive(Debug, Default)]
pub struct TrafficCounters {
    rx_frames: Cell<u64>,
    rx_bytes: Cell<u64>,
    tx_frames: Cell<u64>,
    tx_bytes: Cell<u64>,
}

impl TrafficCounters {
    /// Count one received frame of `len` bytes.
    pub fn record_rx(&self, len: usize) {
        self.rx_frames.set(self.rx_frames.get() + 1);
        self.rx_bytes.set(self.rx_bytes.get() + len as u64);
    }

    /// Count one transmitted frame of `len` bytes plus link overhead.
    pub fn record_tx(&self, len: usize) {
        self.tx_frames.set(self.tx_frames.get() + 1);
        self.tx_bytes.set(self.tx_bytes.get() + len as u64 + TX_OVERHEAD);
    }

    pub fn snapshot(&self) -> TrafficSnapshot {
        TrafficSnapshot {
            rx_frames: self.rx_frames.get(),
            rx_bytes: self.rx_bytes.get(),
            tx_frames: self.tx_frames.get(),
            tx_bytes: self.tx_bytes.get(),
        }
    }
}
