//! KISS byte-stuffing framing.
//!
//! Frame format: FEND + command + escaped(data) + FEND. The high nibble of
//! the command byte selects the TNC port, which lets several logical
//! interfaces share one serial or TCP KISS link.

extern crate alloc;
use alloc::vec::Vec;

use crate::error::FramingError;

pub const FEND: u8 = 0xC0;
pub const FESC: u8 = 0xDB;
pub const TFEND: u8 = 0xDC;
pub const TFESC: u8 = 0xDD;
pub const CMD_DATA: u8 = 0x00;

/// Highest KISS port number addressable from the command byte.
pub const MAX_PORT: u8 = 0x0F;

/// A decoded KISS frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KissFrame {
    pub port: u8,
    pub command: u8,
    pub data: Vec<u8>,
}

impl KissFrame {
    /// Data frame (command nibble 0), as opposed to a TNC parameter command.
    pub fn is_data(&self) -> bool {
        self.command == CMD_DATA
    }
}

/// Escape special bytes in data using KISS byte-stuffing.
///
/// Replaces FEND (0xC0) with FESC + TFEND, and FESC (0xDB) with FESC + TFESC.
pub fn kiss_escape(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());
    for &byte in data {
        match byte {
            FEND => result.extend_from_slice(&[FESC, TFEND]),
            FESC => result.extend_from_slice(&[FESC, TFESC]),
            _ => result.push(byte),
        }
    }
    result
}

/// Frame a data payload for the given TNC port.
pub fn kiss_frame(port: u8, data: &[u8]) -> Vec<u8> {
    let escaped = kiss_escape(data);
    let mut framed = Vec::with_capacity(escaped.len() + 3);
    framed.push(FEND);
    framed.push(((port & MAX_PORT) << 4) | CMD_DATA);
    framed.extend_from_slice(&escaped);
    framed.push(FEND);
    framed
}

/// Remove KISS framing: strip delimiters, split the command byte into port
/// and command, and unescape the data.
pub fn kiss_unframe(framed: &[u8]) -> Result<KissFrame, FramingError> {
    if framed.len() < 3 || framed[0] != FEND || framed[framed.len() - 1] != FEND {
        return Err(FramingError::MissingDelimiter);
    }

    let command_byte = framed[1];
    let inner = &framed[2..framed.len() - 1];
    let mut data = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        if inner[i] == FESC {
            let Some(&next) = inner.get(i + 1) else {
                return Err(FramingError::IncompleteEscape);
            };
            match next {
                TFEND => data.push(FEND),
                TFESC => data.push(FESC),
                other => return Err(FramingError::InvalidEscapeSequence(other)),
            }
            i += 2;
        } else {
            data.push(inner[i]);
            i += 1;
        }
    }
    Ok(KissFrame {
        port: command_byte >> 4,
        command: command_byte & 0x0F,
        data,
    })
}
