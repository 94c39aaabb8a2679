//! Transport kinds an interface can be bound to.

/// Link type of an interface, with the fields only that link needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceKind {
    /// The APRS-IS uplink pseudo-interface.
    AprsIs,
    /// A kernel AX.25 network device.
    Ax25Device { device: String },
    /// A KISS TNC on a serial line; `port` is the TNC port nibble.
    SerialKiss { device: String, port: u8 },
    /// A KISS TNC reached over TCP.
    TcpKiss { host: String, tcp_port: u16, port: u8 },
    /// An AGWPE-protocol soundmodem.
    Agwpe { host: String, tcp_port: u16 },
    /// Discards transmissions after accounting them.
    Null,
}

impl InterfaceKind {
    /// Short name used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            InterfaceKind::AprsIs => "aprsis",
            InterfaceKind::Ax25Device { .. } => "ax25-device",
            InterfaceKind::SerialKiss { .. } => "serial-kiss",
            InterfaceKind::TcpKiss { .. } => "tcp-kiss",
            InterfaceKind::Agwpe { .. } => "agwpe",
            InterfaceKind::Null => "null",
        }
    }

    /// Kinds a beacon may be sent on.
    pub fn is_beaconable(&self) -> bool {
        !matches!(self, InterfaceKind::Agwpe { .. })
    }

    /// Kinds that carry radio telemetry.
    pub fn is_telemetrable(&self) -> bool {
        matches!(
            self,
            InterfaceKind::Ax25Device { .. }
                | InterfaceKind::SerialKiss { .. }
                | InterfaceKind::TcpKiss { .. }
        )
    }

    /// KISS link name and port, for kinds that share a multiplexed link.
    pub fn kiss_link(&self) -> Option<(String, u8)> {
        match self {
            InterfaceKind::SerialKiss { device, port } => Some((device.clone(), *port)),
            InterfaceKind::TcpKiss {
                host,
                tcp_port,
                port,
            } => Some((format!("{host}:{tcp_port}"), *port)),
            _ => None,
        }
    }
}
