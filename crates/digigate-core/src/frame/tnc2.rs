//! Splitting of TNC2 text lines such as those received from APRS-IS.

extern crate alloc;
use alloc::vec::Vec;

use crate::constants::{TNC2_INFO_SEP, TNC2_PATH_SEP, TNC2_SOURCE_SEP};
use crate::error::FrameError;

/// A TNC2 line split into its address heads and payload.
///
/// `heads[0]` is the source, `heads[1]` the destination, and any further
/// entries are path elements exactly as written (including `*` marks and
/// q-constructs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tnc2Line<'a> {
    pub heads: Vec<&'a str>,
    pub payload: &'a [u8],
}

impl<'a> Tnc2Line<'a> {
    /// Originator.
    pub fn source(&self) -> &'a str {
        self.heads[0]
    }

    pub fn destination(&self) -> &'a str {
        self.heads[1]
    }

    /// Path elements after the destination.
    pub fn path(&self) -> &[&'a str] {
        &self.heads[2..]
    }
}

/// Split `SRC>DEST,PATH:payload` at the first `:`.
///
/// The header must be UTF-8 and carry a non-empty source and destination.
pub fn split_tnc2(line: &[u8]) -> Result<Tnc2Line<'_>, FrameError> {
    let colon = line
        .iter()
        .position(|&b| b == TNC2_INFO_SEP)
        .ok_or(FrameError::MissingInfoSeparator)?;
    let header = core::str::from_utf8(&line[..colon]).map_err(|_| FrameError::NonAsciiHeader)?;
    let (source, rest) = header
        .split_once(char::from(TNC2_SOURCE_SEP))
        .ok_or(FrameError::MissingSource)?;
    if source.is_empty() {
        return Err(FrameError::MissingSource);
    }

    let mut heads = Vec::with_capacity(4);
    heads.push(source);
    heads.extend(rest.split(char::from(TNC2_PATH_SEP)));
    if heads[1].is_empty() {
        return Err(FrameError::MissingDestination);
    }

    Ok(Tnc2Line {
        heads,
        payload: &line[colon + 1..],
    })
}
