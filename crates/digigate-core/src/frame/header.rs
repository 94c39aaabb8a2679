//! AX.25 address header: destination, source and up to eight via fields.

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::address::Ax25Address;
use crate::constants::{
    ADDRESS_FIELD_LEN, MAX_ADDRESS_FIELDS, MAX_VIA, MIN_ADDRESS_HEADER, TNC2_PATH_SEP,
    TNC2_REPEATED_MARK, TNC2_SOURCE_SEP,
};
use crate::error::{AddressError, FrameError};

/// Ordered address fields of one frame. The wire order is destination,
/// source, then vias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressHeader {
    fields: Vec<Ax25Address>,
}

impl AddressHeader {
    /// Header with no vias.
    pub fn new(dest: Ax25Address, src: Ax25Address) -> Self {
        let mut fields = Vec::with_capacity(MAX_ADDRESS_FIELDS);
        fields.push(dest);
        fields.push(src);
        Self { fields }
    }

    /// Build a header from callsign text, failing on the first invalid field.
    pub fn from_text(dest: &str, src: &str, vias: &[&str]) -> Result<Self, AddressError> {
        let mut header = Self::new(Ax25Address::parse(dest)?, Ax25Address::parse(src)?);
        for via in vias {
            header.push_via(Ax25Address::parse(via)?)?;
        }
        Ok(header)
    }

    /// Append a via. Fails with `TooManyVia` past the eighth.
    pub fn push_via(&mut self, via: Ax25Address) -> Result<(), AddressError> {
        let vias = self.fields.len() - 2;
        if vias >= MAX_VIA {
            return Err(AddressError::TooManyVia {
                max: MAX_VIA,
                actual: vias + 1,
            });
        }
        self.fields.push(via);
        Ok(())
    }

    /// Destination field.
    pub fn dest(&self) -> &Ax25Address {
        &self.fields[0]
    }

    /// Source field.
    pub fn src(&self) -> &Ax25Address {
        &self.fields[1]
    }

    /// Via fields in path order.
    pub fn vias(&self) -> &[Ax25Address] {
        &self.fields[2..]
    }

    /// Number of address fields, dest and src included.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Length of the encoded header in bytes.
    pub fn encoded_len(&self) -> usize {
        self.fields.len() * ADDRESS_FIELD_LEN
    }

    /// Serialize the header with the end-of-address bit set on the last
    /// field only.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        let last = self.fields.len() - 1;
        for (i, field) in self.fields.iter().enumerate() {
            let mut field = *field;
            field.set_last(i == last);
            out.extend_from_slice(field.as_bytes());
        }
        out
    }

    /// Parse the address header at the start of a raw frame.
    ///
    /// Returns the header and the number of bytes it occupied.
    pub fn parse(raw: &[u8]) -> Result<(Self, usize), FrameError> {
        if raw.len() < MIN_ADDRESS_HEADER {
            return Err(FrameError::ShortAddressHeader { len: raw.len() });
        }
        let mut fields = Vec::with_capacity(MAX_ADDRESS_FIELDS);
        for chunk in raw.chunks_exact(ADDRESS_FIELD_LEN) {
            if fields.len() == MAX_ADDRESS_FIELDS {
                return Err(FrameError::TooManyAddresses {
                    max: MAX_ADDRESS_FIELDS,
                });
            }
            let mut arr = [0u8; ADDRESS_FIELD_LEN];
            arr.copy_from_slice(chunk);
            let field = Ax25Address::new(arr);
            fields.push(field);
            if field.is_last() {
                if fields.len() < 2 {
                    return Err(FrameError::ShortAddressHeader {
                        len: ADDRESS_FIELD_LEN,
                    });
                }
                let consumed = fields.len() * ADDRESS_FIELD_LEN;
                return Ok((Self { fields }, consumed));
            }
        }
        Err(FrameError::UnterminatedAddress)
    }

    /// Render as TNC2 `SRC>DEST,VIA,VIA*`.
    ///
    /// The `*` goes after the last via whose has-been-repeated bit is set.
    pub fn to_tnc2(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.src().callsign());
        out.push(char::from(TNC2_SOURCE_SEP));
        out.push_str(&self.dest().callsign());
        let marked = self.vias().iter().rposition(Ax25Address::has_been_repeated);
        for (i, via) in self.vias().iter().enumerate() {
            out.push(char::from(TNC2_PATH_SEP));
            out.push_str(&via.callsign());
            if Some(i) == marked {
                out.push(char::from(TNC2_REPEATED_MARK));
            }
        }
        out
    }
}
