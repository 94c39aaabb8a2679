//! Capacity-checked byte assembly for outgoing frames.

extern crate alloc;
use alloc::vec::Vec;

use crate::constants::FRAME_BUILD_MAX;
use crate::error::BufferError;

/// Accumulates frame bytes up to a fixed limit.
///
/// Every append is checked; a frame that would overflow fails with
/// [`BufferError::TooLarge`] instead of being silently truncated.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    buf: Vec<u8>,
    cap: usize,
}

impl FrameBuilder {
    /// Builder capped at `FRAME_BUILD_MAX` bytes.
    pub fn new() -> Self {
        Self::with_limit(FRAME_BUILD_MAX)
    }

    /// Builder capped at `cap` bytes.
    pub fn with_limit(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap.min(512)),
            cap,
        }
    }

    /// Append one byte.
    pub fn push(&mut self, byte: u8) -> Result<(), BufferError> {
        self.reserve(1)?;
        self.buf.push(byte);
        Ok(())
    }

    /// Append bytes, all or nothing.
    pub fn extend(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        self.reserve(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    pub fn extend_str(&mut self, text: &str) -> Result<(), BufferError> {
        self.extend(text.as_bytes())
    }

    fn reserve(&self, extra: usize) -> Result<(), BufferError> {
        let needed = self.buf.len() + extra;
        if needed > self.cap {
            return Err(BufferError::TooLarge {
                cap: self.cap,
                needed,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}
