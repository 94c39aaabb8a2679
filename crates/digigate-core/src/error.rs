//! Error types for the digigate-core crate.

use core::fmt;

/// Why a callsign was refused by the strict AX.25 encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallsignFault {
    Empty,
    BaseTooLong(usize),
    BadCharacter(char),
    BadSsid,
}

impl fmt::Display for CallsignFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallsignFault::Empty => write!(f, "empty callsign"),
            CallsignFault::BaseTooLong(len) => {
                write!(f, "callsign base is {len} characters, at most 6 allowed")
            }
            CallsignFault::BadCharacter(c) => write!(f, "invalid character {c:?}"),
            CallsignFault::BadSsid => write!(f, "SSID must be a number 0..15"),
        }
    }
}

/// Errors from callsign encoding and address header assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    InvalidCallsign(CallsignFault),
    TooManyVia { max: usize, actual: usize },
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::InvalidCallsign(fault) => write!(f, "invalid callsign: {fault}"),
            AddressError::TooManyVia { max, actual } => {
                write!(f, "too many via fields: at most {max}, got {actual}")
            }
        }
    }
}

impl From<CallsignFault> for AddressError {
    fn from(fault: CallsignFault) -> Self {
        AddressError::InvalidCallsign(fault)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AddressError {}

/// Errors from parsing or splitting a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    ShortAddressHeader { len: usize },
    UnterminatedAddress,
    TooManyAddresses { max: usize },
    MissingControl,
    MissingInfoSeparator,
    MissingSource,
    MissingDestination,
    NonAsciiHeader,
    Address(AddressError),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::ShortAddressHeader { len } => {
                write!(f, "address header too short: need at least 14 bytes, got {len}")
            }
            FrameError::UnterminatedAddress => write!(f, "address header has no end-of-address bit"),
            FrameError::TooManyAddresses { max } => {
                write!(f, "address header has more than {max} fields")
            }
            FrameError::MissingControl => write!(f, "frame ends before the control byte"),
            FrameError::MissingInfoSeparator => write!(f, "TNC2 text has no ':' separator"),
            FrameError::MissingSource => write!(f, "TNC2 header has no source callsign"),
            FrameError::MissingDestination => write!(f, "TNC2 header has no destination"),
            FrameError::NonAsciiHeader => write!(f, "TNC2 header is not ASCII text"),
            FrameError::Address(e) => write!(f, "address error: {e}"),
        }
    }
}

impl From<AddressError> for FrameError {
    fn from(e: AddressError) -> Self {
        FrameError::Address(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}

/// Errors from building a packet buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    TooLarge { cap: usize, needed: usize },
    SplitOutOfRange { split: usize, len: usize },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::TooLarge { cap, needed } => {
                write!(f, "buffer too large: need {needed} bytes, capacity is {cap}")
            }
            BufferError::SplitOutOfRange { split, len } => {
                write!(f, "address length {split} exceeds frame length {len}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BufferError {}

/// Errors from KISS framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    MissingDelimiter,
    IncompleteEscape,
    InvalidEscapeSequence(u8),
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramingError::MissingDelimiter => write!(f, "missing frame delimiter"),
            FramingError::IncompleteEscape => write!(f, "incomplete escape sequence"),
            FramingError::InvalidEscapeSequence(b) => {
                write!(f, "invalid escape sequence: 0x{b:02x}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FramingError {}

/// Error returned when a byte slice has the wrong length for a fixed-size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidLength {
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for InvalidLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid length: expected {}, got {}",
            self.expected, self.actual
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidLength {}
