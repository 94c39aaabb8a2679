//! Packet dispatch between radio interfaces, APRS-IS and the digipeaters.
//!
//! The [`Gateway`] is the central dispatcher. Its entry points process one
//! frame synchronously and return [`RouterAction`]s for the caller to carry
//! out.

pub mod beacon;
pub mod constants;
pub mod dispatch;
pub mod igate;
pub mod self_message;
pub mod types;

pub use beacon::BeaconOutcome;
pub use constants::*;
pub use dispatch::{Gateway, StationIdentity};
pub use self_message::{AckOutcome, SelfMessageOutcome, SelfTarget};
pub use types::{AprsIsLine, QType, RfDirection, RfLogRecord, RouterAction};
