//! APRS packet type bitmask.
//!
//! A packet can carry several types at once, e.g. a third-party packet
//! that encapsulates a message is `THIRDPARTY | MESSAGE`.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// Packet type bit set, filled in by the APRS classifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PacketKind(u16);

impl PacketKind {
    pub const NONE: PacketKind = PacketKind(0);
    pub const POSITION: PacketKind = PacketKind(1 << 0);
    pub const OBJECT: PacketKind = PacketKind(1 << 1);
    pub const ITEM: PacketKind = PacketKind(1 << 2);
    pub const MESSAGE: PacketKind = PacketKind(1 << 3);
    pub const NWS: PacketKind = PacketKind(1 << 4);
    pub const WX: PacketKind = PacketKind(1 << 5);
    pub const TELEMETRY: PacketKind = PacketKind(1 << 6);
    pub const QUERY: PacketKind = PacketKind(1 << 7);
    pub const STATUS: PacketKind = PacketKind(1 << 8);
    pub const USERDEF: PacketKind = PacketKind(1 << 9);
    pub const THIRDPARTY: PacketKind = PacketKind(1 << 10);
    pub const BULLETIN: PacketKind = PacketKind(1 << 11);

    const NAMES: [(PacketKind, &'static str); 12] = [
        (Self::POSITION, "position"),
        (Self::OBJECT, "object"),
        (Self::ITEM, "item"),
        (Self::MESSAGE, "message"),
        (Self::NWS, "nws"),
        (Self::WX, "wx"),
        (Self::TELEMETRY, "telemetry"),
        (Self::QUERY, "query"),
        (Self::STATUS, "status"),
        (Self::USERDEF, "userdef"),
        (Self::THIRDPARTY, "thirdparty"),
        (Self::BULLETIN, "bulletin"),
    ];

    pub const fn from_bits(bits: u16) -> Self {
        PacketKind(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// All bits of `other` are set.
    pub const fn contains(self, other: PacketKind) -> bool {
        self.0 & other.0 == other.0
    }

    /// Any bit of `other` is set.
    pub const fn intersects(self, other: PacketKind) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: PacketKind) {
        self.0 |= other.0;
    }
}

impl BitOr for PacketKind {
    type Output = PacketKind;

    fn bitor(self, rhs: PacketKind) -> PacketKind {
        PacketKind(self.0 | rhs.0)
    }
}

impl BitOrAssign for PacketKind {
    fn bitor_assign(&mut self, rhs: PacketKind) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "PacketKind(none)");
        }
        write!(f, "PacketKind(")?;
        let mut first = true;
        for (kind, name) in Self::NAMES {
            if self.contains(kind) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        write!(f, ")")
    }
}
