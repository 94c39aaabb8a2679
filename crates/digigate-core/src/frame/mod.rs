//! AX.25 frames and their TNC2 text rendering.

pub mod header;
pub mod tnc2;

extern crate alloc;
use alloc::vec::Vec;

use crate::constants::{CONTROL_POLL_FINAL, CONTROL_UI, PID_NO_LAYER3, TNC2_INFO_SEP};
use crate::error::FrameError;
use header::AddressHeader;

/// A parsed AX.25 frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ax25Frame {
    pub header: AddressHeader,
    pub control: u8,
    pub pid: Option<u8>,
    pub info: Vec<u8>,
}

impl Ax25Frame {
    /// Parse a raw AX.25 frame: address header, control and optional PID.
    pub fn parse(raw: &[u8]) -> Result<Self, FrameError> {
        let (header, offset) = AddressHeader::parse(raw)?;
        let control = *raw.get(offset).ok_or(FrameError::MissingControl)?;
        let mut body = offset + 1;

        // I-frames and UI-frames carry a protocol identifier.
        let has_pid = control & 0x01 == 0 || control & !CONTROL_POLL_FINAL == CONTROL_UI;
        let pid = if has_pid {
            let pid = raw.get(body).copied();
            if pid.is_some() {
                body += 1;
            }
            pid
        } else {
            None
        };

        Ok(Self {
            header,
            control,
            pid,
            info: raw[body..].to_vec(),
        })
    }

    /// Unnumbered-information frame, poll/final bit ignored.
    pub fn is_ui(&self) -> bool {
        self.control & !CONTROL_POLL_FINAL == CONTROL_UI
    }

    /// UI frame with PID 0xF0, the shape every APRS packet has.
    pub fn is_aprs(&self) -> bool {
        self.is_ui() && self.pid == Some(PID_NO_LAYER3)
    }

    /// PID of a UI frame, whatever its value.
    pub fn ui_pid(&self) -> Option<u8> {
        if self.is_ui() { self.pid } else { None }
    }

    /// TNC2 text and the length of its address part (excluding the `:`).
    pub fn to_tnc2(&self) -> (Vec<u8>, usize) {
        let address = self.header.to_tnc2();
        let mut text = Vec::with_capacity(address.len() + 1 + self.info.len());
        text.extend_from_slice(address.as_bytes());
        text.push(TNC2_INFO_SEP);
        text.extend_from_slice(&self.info);
        (text, address.len())
    }
}

/// A frame as delivered by a radio transport: the raw AX.25 bytes plus its
/// TNC2 rendering, with the split points of both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFrame {
    pub ax25: Vec<u8>,
    pub ax25_addr_len: usize,
    pub tnc2: Vec<u8>,
    pub tnc2_addr_len: usize,
    pub is_aprs: bool,
    pub ui_pid: Option<u8>,
}

impl ReceivedFrame {
    /// Build both wire forms of a frame heard on a radio interface.
    pub fn from_ax25(raw: &[u8]) -> Result<Self, FrameError> {
        let frame = Ax25Frame::parse(raw)?;
        let (tnc2, tnc2_addr_len) = frame.to_tnc2();
        Ok(Self {
            ax25: raw.to_vec(),
            ax25_addr_len: frame.header.encoded_len(),
            tnc2,
            tnc2_addr_len,
            is_aprs: frame.is_aprs(),
            ui_pid: frame.ui_pid(),
        })
    }

    /// Encoded address header.
    pub fn ax25_address(&self) -> &[u8] {
        &self.ax25[..self.ax25_addr_len.min(self.ax25.len())]
    }

    /// `SRC>DEST,PATH` text.
    pub fn tnc2_address(&self) -> &[u8] {
        &self.tnc2[..self.tnc2_addr_len.min(self.tnc2.len())]
    }
}
