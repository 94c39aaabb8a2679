//! Immutable packet buffer shared by every consumer of one received or
//! synthesized frame.

extern crate alloc;
use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use crate::aprs::{self, Classification};
use crate::constants::PBUF_MAX;
use crate::error::BufferError;
use crate::frame::ReceivedFrame;
use crate::packet::kind::PacketKind;

/// One frame in both AX.25 and TNC2 form, plus its classification.
///
/// The two representations are fixed at construction. Only the
/// classification and the originating interface group are filled in
/// afterwards, before the buffer is handed to its consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketBuffer {
    ax25: Vec<u8>,
    ax25_addr_len: usize,
    tnc2: Vec<u8>,
    tnc2_addr_len: usize,
    is_aprs: bool,
    digi_like_aprs: bool,
    source_if_group: u16,
    received_at: u64,
    classification: Classification,
}

impl PacketBuffer {
    /// Copy a frame into a new buffer.
    ///
    /// Fails when the combined AX.25 and TNC2 size exceeds [`PBUF_MAX`] or
    /// when either address length points past its frame.
    pub fn new(
        frame: &ReceivedFrame,
        digi_like_aprs: bool,
        received_at: u64,
    ) -> Result<Self, BufferError> {
        let needed = frame.ax25.len() + frame.tnc2.len();
        if needed > PBUF_MAX {
            return Err(BufferError::TooLarge {
                cap: PBUF_MAX,
                needed,
            });
        }
        if frame.ax25_addr_len > frame.ax25.len() {
            return Err(BufferError::SplitOutOfRange {
                split: frame.ax25_addr_len,
                len: frame.ax25.len(),
            });
        }
        if frame.tnc2_addr_len > frame.tnc2.len() {
            return Err(BufferError::SplitOutOfRange {
                split: frame.tnc2_addr_len,
                len: frame.tnc2.len(),
            });
        }
        Ok(Self {
            ax25: frame.ax25.clone(),
            ax25_addr_len: frame.ax25_addr_len,
            tnc2: frame.tnc2.clone(),
            tnc2_addr_len: frame.tnc2_addr_len,
            is_aprs: frame.is_aprs,
            digi_like_aprs,
            source_if_group: 0,
            received_at,
            classification: Classification::default(),
        })
    }

    /// Run the built-in classifier over the TNC2 text.
    pub fn classify(&mut self) -> bool {
        self.classification = aprs::classify(&self.tnc2, self.tnc2_addr_len);
        !self.classification.kind.is_empty()
    }

    /// Replace the classification, as done by an external APRS parser.
    pub fn set_classification(&mut self, classification: Classification) {
        self.classification = classification;
    }

    /// Tag the buffer with the igate group it was received on.
    pub fn set_source_if_group(&mut self, group: u16) {
        self.source_if_group = group;
    }

    /// Full AX.25 frame: address header, control, PID and information.
    pub fn ax25(&self) -> &[u8] {
        &self.ax25
    }

    /// AX.25 address header.
    pub fn ax25_address(&self) -> &[u8] {
        &self.ax25[..self.ax25_addr_len]
    }

    /// AX.25 bytes after the address header: control, PID and info.
    pub fn ax25_body(&self) -> &[u8] {
        &self.ax25[self.ax25_addr_len..]
    }

    /// Full TNC2 line.
    pub fn tnc2(&self) -> &[u8] {
        &self.tnc2
    }

    /// TNC2 address part, before the `:`.
    pub fn tnc2_address(&self) -> &[u8] {
        &self.tnc2[..self.tnc2_addr_len]
    }

    /// TNC2 bytes after the `:` separator.
    pub fn tnc2_info(&self) -> &[u8] {
        self.tnc2.get(self.tnc2_addr_len + 1..).unwrap_or(&[])
    }

    /// APRS information field; for third-party packets, the inner one.
    pub fn aprs_info(&self) -> &[u8] {
        match self.classification.info_offset {
            Some(offset) => self.tnc2.get(offset..).unwrap_or(&[]),
            None => self.tnc2_info(),
        }
    }

    /// TNC2 line as text, lossily decoded.
    pub fn tnc2_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.tnc2)
    }

    /// UI frame with PID `0xF0`.
    pub fn is_aprs(&self) -> bool {
        self.is_aprs
    }

    /// Digipeated with APRS rules: APRS, or any UI frame.
    pub fn digi_like_aprs(&self) -> bool {
        self.digi_like_aprs
    }

    /// Igate group of the receiving interface; 0 for APRS-IS.
    pub fn source_if_group(&self) -> u16 {
        self.source_if_group
    }

    /// Receive time, seconds since the Unix epoch.
    pub fn received_at(&self) -> u64 {
        self.received_at
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Packet type flags.
    pub fn kind(&self) -> PacketKind {
        self.classification.kind
    }

    /// Originator; the inner source for third-party packets.
    pub fn src_name(&self) -> Option<&str> {
        self.classification.src_name.as_deref()
    }

    /// Message addressee, padding removed.
    pub fn dst_name(&self) -> Option<&str> {
        self.classification.dst_name.as_deref()
    }

    /// Total stored bytes of both representations.
    pub fn stored_len(&self) -> usize {
        self.ax25.len() + self.tnc2.len()
    }
}
