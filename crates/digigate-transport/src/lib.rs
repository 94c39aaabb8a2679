//! Interface registry and packet gating for the digigate APRS gateway.
//!
//! This crate owns the logical interfaces, dispatches received radio frames
//! to their digipeater sources, gates APRS-IS traffic onto RF under the
//! Tx-IGate rules, answers messages addressed to the station itself, and
//! transmits beacons.

pub mod dedup;
pub mod digipeater;
pub mod error;
pub mod gate_decision;
pub mod history;
pub mod interface;
pub mod router;
pub mod services;

pub use digipeater::{Digipeater, DigipeaterId, DigipeaterSource};
pub use error::{BeaconError, GateError, RegistryError, TransportError};
pub use history::{HistoryEntry, MemoryHistory};
pub use interface::{Interface, InterfaceIndex, InterfaceKind, InterfaceRegistry, InterfaceSpec};
pub use router::{Gateway, RouterAction, StationIdentity};
pub use services::{AprsParser, BasicAprsParser, DupeCheck, FilterVerdict, HistoryDb, SourceFilter, Transport};
