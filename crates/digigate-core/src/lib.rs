//! Core types, constants, and wire formats for the digigate APRS gateway.
//!
//! This crate defines the AX.25 address codec, TNC2 text conversion, KISS
//! framing, and the immutable packet buffer shared between the receive
//! dispatch, the Internet-to-RF gate, and the beacon transmitter.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod address;
pub mod aprs;
pub mod constants;
pub mod error;
pub mod frame;
pub mod framing;
pub mod packet;

pub use address::{Ax25Address, decode_callsign, encode_callsign, validate_callsign};
pub use aprs::{AprsMessage, Classification};
pub use error::{AddressError, BufferError, CallsignFault, FrameError, FramingError, InvalidLength};
pub use frame::header::AddressHeader;
pub use frame::tnc2::{Tnc2Line, split_tnc2};
pub use frame::{Ax25Frame, ReceivedFrame};
pub use packet::buffer::PacketBuffer;
pub use packet::builder::FrameBuilder;
pub use packet::kind::PacketKind;
