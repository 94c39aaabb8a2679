//! Transport layer error types.

use digigate_core::error::{AddressError, BufferError, FrameError, FramingError};

/// Errors raised while building the interface registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid callsign {callsign:?} for a {role} interface")]
    InvalidCallsign {
        callsign: String,
        role: &'static str,
    },

    #[error("duplicate interface callsign {0}")]
    DuplicateCallsign(String),

    #[error("interface group {group} outside 1..{max}")]
    GroupOutOfRange { group: u16, max: u16 },

    #[error("unknown interface index {0}")]
    UnknownInterface(usize),

    #[error("unknown digipeater {0}")]
    UnknownDigipeater(usize),

    #[error("interface {0} cannot transmit")]
    NotTransmitter(String),

    #[error("address error: {0}")]
    Address(#[from] AddressError),
}

/// Errors from handing a frame to a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    #[error("no transport attached to interface {0}")]
    NotAttached(String),

    #[error("transmit failed: {0}")]
    TransmitFailed(String),
}

/// Errors from the receive and gating paths.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("unknown interface index {0}")]
    UnknownInterface(usize),

    #[error("third-party frame needs source and destination, got {0} address heads")]
    IncompleteHeads(usize),

    #[error("no interface on KISS link {link} port {port}")]
    UnknownKissPort { link: String, port: u8 },

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    #[error("address error: {0}")]
    Address(#[from] AddressError),
}

/// Errors from beacon encoding and transmission.
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    #[error("beacon address error: {0}")]
    Address(#[from] AddressError),

    #[error("empty via field in {0:?}")]
    EmptyVia(String),

    #[error("beacon payload needs control and PID bytes, got {0} bytes")]
    PayloadTooShort(usize),

    #[error("transmit failed: {0}")]
    Transport(#[from] TransportError),
}
