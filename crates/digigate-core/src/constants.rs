//! Protocol constants for AX.25 UI frames and APRS packet buffers.

// Address field layout
pub const ADDRESS_FIELD_LEN: usize = 7;
pub const CALLSIGN_BASE_MAX: usize = 6;
pub const MAX_SSID: u8 = 15;
pub const MAX_VIA: usize = 8;
pub const MAX_ADDRESS_FIELDS: usize = MAX_VIA + 2;
pub const MIN_ADDRESS_HEADER: usize = 2 * ADDRESS_FIELD_LEN;

// SSID byte bits
pub const SSID_FLAGS: u8 = 0x60;
pub const SSID_MASK: u8 = 0x1E;
pub const END_OF_ADDRESS: u8 = 0x01;
pub const HAS_BEEN_REPEATED: u8 = 0x80;

// Control and protocol identifier
pub const CONTROL_UI: u8 = 0x03;
pub const CONTROL_POLL_FINAL: u8 = 0x10;
pub const PID_NO_LAYER3: u8 = 0xF0;

/// Combined AX.25 + TNC2 storage limit of a single packet buffer.
pub const PBUF_MAX: usize = 2100;

/// Scratch capacity used while assembling a frame before it is sealed.
pub const FRAME_BUILD_MAX: usize = 2800;

/// Longest callsign or APRS-IS login, including any SSID suffix.
pub const NAME_MAX: usize = 9;

/// TNC2 header separators.
pub const TNC2_SOURCE_SEP: u8 = b'>';
pub const TNC2_PATH_SEP: u8 = b',';
pub const TNC2_INFO_SEP: u8 = b':';
pub const TNC2_REPEATED_MARK: u8 = b'*';

/// Data type identifier of an APRS third-party packet.
pub const DTI_THIRDPARTY: u8 = b'}';

/// Destination field `APRS` used on every gated frame.
pub const APRS_DESTINATION: [u8; ADDRESS_FIELD_LEN] = [
    b'A' << 1,
    b'P' << 1,
    b'R' << 1,
    b'S' << 1,
    b' ' << 1,
    b' ' << 1,
    SSID_FLAGS,
];
