//! Router constants.

/// Seconds within which a station counts as recently heard.
pub const RECENT_WINDOW: u64 = 3600;

/// Gateway type tag inserted into third-party headers of APRS-IS traffic.
pub const DEFAULT_GATEWAY_TYPE: &str = "TCPIP";

/// Path suffix of acknowledgements sent to APRS-IS.
pub const APRSIS_ACK_PATH: &str = "APRS,TCPIP*";

/// Interface name used in raw-frame log records of APRS-IS traffic.
pub const APRSIS_LOG_NAME: &str = "APRSIS";
