//! AX.25 address field codec.
//!
//! An address field is six callsign characters, each shifted left by one
//! bit and space-padded, followed by an SSID byte carrying
//! `flags | ssid << 1`. Bit 0 of the SSID byte marks the last field of the
//! header and bit 7 is the has-been-repeated flag of a via field.

extern crate alloc;
use alloc::string::String;
use core::fmt;

use crate::constants::{
    ADDRESS_FIELD_LEN, CALLSIGN_BASE_MAX, END_OF_ADDRESS, HAS_BEEN_REPEATED, MAX_SSID, NAME_MAX,
    SSID_FLAGS, SSID_MASK,
};
use crate::error::{AddressError, CallsignFault, InvalidLength};

const PADDING: u8 = b' ' << 1;

/// Split `BASE[-SSID]` and check it against the AX.25 encodable form.
fn split_strict(text: &str) -> Result<(&str, u8), CallsignFault> {
    let (base, ssid_text) = match text.split_once('-') {
        Some((base, ssid)) => (base, Some(ssid)),
        None => (text, None),
    };
    if base.is_empty() {
        return Err(CallsignFault::Empty);
    }
    if let Some(c) = base.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(CallsignFault::BadCharacter(c));
    }
    if base.len() > CALLSIGN_BASE_MAX {
        return Err(CallsignFault::BaseTooLong(base.len()));
    }
    let ssid = match ssid_text {
        Some(s) => parse_ssid(s).ok_or(CallsignFault::BadSsid)?,
        None => 0,
    };
    Ok((base, ssid))
}

fn parse_ssid(text: &str) -> Option<u8> {
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let ssid: u8 = text.parse().ok()?;
    (ssid <= MAX_SSID).then_some(ssid)
}

/// Encode `BASE[-SSID]` into a 7-byte address field.
///
/// Lowercase letters are folded to uppercase. `flags` supplies the bits of
/// the SSID byte outside the SSID itself (normally [`SSID_FLAGS`]); the
/// end-of-address bit is left to the header assembler.
pub fn encode_callsign(text: &str, flags: u8) -> Result<[u8; ADDRESS_FIELD_LEN], AddressError> {
    let (base, ssid) = split_strict(text)?;
    let mut field = [PADDING; ADDRESS_FIELD_LEN];
    for (slot, b) in field.iter_mut().zip(base.bytes()) {
        *slot = b.to_ascii_uppercase() << 1;
    }
    field[6] = (flags & !SSID_MASK) | (ssid << 1);
    Ok(field)
}

/// Decode a 7-byte address field back to `BASE[-SSID]` text.
///
/// SSID 0 is rendered without a suffix, so `N0CALL-0` decodes as `N0CALL`.
pub fn decode_callsign(field: &[u8; ADDRESS_FIELD_LEN]) -> String {
    let mut text = String::with_capacity(NAME_MAX);
    for &b in &field[..6] {
        text.push(char::from((b >> 1) & 0x7F));
    }
    let trimmed = text.trim_end().len();
    text.truncate(trimmed);

    let ssid = (field[6] & SSID_MASK) >> 1;
    if ssid != 0 {
        text.push('-');
        if ssid >= 10 {
            text.push('1');
        }
        text.push(char::from(b'0' + ssid % 10));
    }
    text
}

/// Canonical text of a strictly valid callsign: uppercase, no `-0` suffix.
pub fn normalize_callsign(text: &str) -> Result<String, AddressError> {
    let field = encode_callsign(text, SSID_FLAGS)?;
    Ok(decode_callsign(&field))
}

/// Check a callsign for the role it will play.
///
/// Transmitting interfaces need a callsign that encodes into an AX.25
/// address field. Receive-only interfaces may use the looser APRS-IS login
/// form: up to nine alphanumerics with at most one inner hyphen and an
/// alphanumeric SSID of one or two characters.
pub fn validate_callsign(text: &str, requires_tx: bool) -> bool {
    if requires_tx {
        split_strict(text).is_ok()
    } else {
        is_valid_login(text)
    }
}

fn is_valid_login(text: &str) -> bool {
    if text.is_empty() || text.len() > NAME_MAX {
        return false;
    }
    let (base, ssid) = match text.split_once('-') {
        Some((base, ssid)) => (base, Some(ssid)),
        None => (text, None),
    };
    if base.is_empty() || !base.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return false;
    }
    match ssid {
        Some(s) => (1..=2).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_alphanumeric()),
        None => true,
    }
}

/// An encoded 7-byte AX.25 address field.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub struct Ax25Address(pub(crate) [u8; ADDRESS_FIELD_LEN]);

impl Ax25Address {
    /// Wrap an already encoded address field.
    pub const fn new(field: [u8; ADDRESS_FIELD_LEN]) -> Self {
        Self(field)
    }

    /// Encode a strictly valid callsign with the default SSID flag bits.
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        encode_callsign(text, SSID_FLAGS).map(Self)
    }

    /// Encode whatever part of `text` fits an address field.
    ///
    /// Non-alphanumerics are dropped, the base is cut at six characters and
    /// an unusable SSID becomes 0. Only suitable for frames that are
    /// classified and thrown away, never for frames put on the air.
    pub fn relaxed(text: &str) -> Self {
        let (base, ssid_text) = text.split_once('-').unwrap_or((text, ""));
        let mut field = [PADDING; ADDRESS_FIELD_LEN];
        let chars = base
            .bytes()
            .filter(u8::is_ascii_alphanumeric)
            .take(CALLSIGN_BASE_MAX);
        for (slot, b) in field.iter_mut().zip(chars) {
            *slot = b.to_ascii_uppercase() << 1;
        }
        let ssid = parse_ssid(ssid_text).unwrap_or(0);
        field[6] = SSID_FLAGS | (ssid << 1);
        Self(field)
    }

    /// Callsign text without the SSID.
    pub fn callsign(&self) -> String {
        decode_callsign(&self.0)
    }

    /// SSID in `0..=15`.
    pub fn ssid(&self) -> u8 {
        (self.0[6] & SSID_MASK) >> 1
    }

    /// End-of-address bit.
    pub fn is_last(&self) -> bool {
        self.0[6] & END_OF_ADDRESS != 0
    }

    /// H-bit: a digipeater has already repeated the frame through this field.
    pub fn has_been_repeated(&self) -> bool {
        self.0[6] & HAS_BEEN_REPEATED != 0
    }

    /// Set or clear the end-of-address bit.
    pub fn set_last(&mut self, last: bool) {
        if last {
            self.0[6] |= END_OF_ADDRESS;
        } else {
            self.0[6] &= !END_OF_ADDRESS;
        }
    }

    /// Set or clear the H-bit.
    pub fn set_repeated(&mut self, repeated: bool) {
        if repeated {
            self.0[6] |= HAS_BEEN_REPEATED;
        } else {
            self.0[6] &= !HAS_BEEN_REPEATED;
        }
    }

    /// The raw 7-byte field.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_FIELD_LEN] {
        &self.0
    }

    /// Same station, ignoring the flag bits of the SSID byte.
    pub fn same_station(&self, other: &Ax25Address) -> bool {
        self.0[..6] == other.0[..6] && self.ssid() == other.ssid()
    }
}

impl AsRef<[u8]> for Ax25Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Ax25Address {
    type Error = InvalidLength;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; ADDRESS_FIELD_LEN] = bytes.try_into().map_err(|_| InvalidLength {
            expected: ADDRESS_FIELD_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Ax25Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.callsign())
    }
}

impl fmt::Debug for Ax25Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ax25Address({}", self.callsign())?;
        if self.has_been_repeated() {
            write!(f, "*")?;
        }
        write!(f, ")")
    }
}
