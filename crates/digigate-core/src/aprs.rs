//! Lightweight APRS classification.
//!
//! Enough of the APRS data type identifiers are recognised to drive the
//! gating decisions: messages and their addressee, weather-service
//! bulletins, third-party encapsulation, and the common position and
//! status formats.

extern crate alloc;
use alloc::borrow::ToOwned;
use alloc::string::String;

use crate::constants::{DTI_THIRDPARTY, NAME_MAX, TNC2_INFO_SEP, TNC2_SOURCE_SEP};
use crate::packet::kind::PacketKind;

/// Addressee prefixes of National Weather Service style bulletins.
const NWS_PREFIXES: [&str; 5] = ["NWS-", "NWS_", "SKY", "CWA", "BOM"];

/// Path markers showing a third-party packet came from the Internet side.
const INTERNET_MARKERS: [&[u8]; 2] = [b",TCPIP*", b",TCPXX*"];

/// Result of classifying one packet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub kind: PacketKind,
    /// Originating station. For third-party packets this is the source of
    /// the encapsulated frame.
    pub src_name: Option<String>,
    /// Message addressee, when the packet is a directed message.
    pub dst_name: Option<String>,
    /// Offset of the APRS information field within the TNC2 text.
    pub info_offset: Option<usize>,
}

/// A parsed APRS message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AprsMessage {
    pub addressee: String,
    pub text: String,
    pub msgid: Option<String>,
    pub is_ack: bool,
    pub is_rej: bool,
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn find(haystack: &[u8], byte: u8) -> Option<usize> {
    haystack.iter().position(|&b| b == byte)
}

/// Classify TNC2 text whose address part is `addr_len` bytes long.
pub fn classify(tnc2: &[u8], addr_len: usize) -> Classification {
    let mut c = Classification::default();
    let Some(header) = tnc2.get(..addr_len) else {
        return c;
    };
    if let Some(gt) = find(header, TNC2_SOURCE_SEP) {
        c.src_name = Some(lossy(&header[..gt]));
    }
    if tnc2.get(addr_len) != Some(&TNC2_INFO_SEP) {
        return c;
    }

    let mut info_offset = addr_len + 1;
    if tnc2.get(info_offset) == Some(&DTI_THIRDPARTY) {
        c.kind |= PacketKind::THIRDPARTY;
        let inner_start = info_offset + 1;
        let inner = &tnc2[inner_start..];
        let Some(colon) = find(inner, TNC2_INFO_SEP) else {
            return c;
        };
        if let Some(gt) = find(&inner[..colon], TNC2_SOURCE_SEP) {
            c.src_name = Some(lossy(&inner[..gt]));
        }
        info_offset = inner_start + colon + 1;
    }

    c.info_offset = Some(info_offset);
    classify_info(&tnc2[info_offset..], &mut c);
    c
}

fn classify_info(info: &[u8], c: &mut Classification) {
    match info.first() {
        Some(b':') => {
            let Some(addressee) = message_addressee(info) else {
                return;
            };
            c.kind |= PacketKind::MESSAGE;
            if NWS_PREFIXES.iter().any(|p| addressee.starts_with(p)) {
                c.kind |= PacketKind::NWS;
            }
            if addressee.starts_with("BLN") {
                c.kind |= PacketKind::BULLETIN;
            } else {
                c.dst_name = Some(addressee.to_owned());
            }
        }
        Some(b'!' | b'=' | b'/' | b'@' | b'`' | b'\'') => c.kind |= PacketKind::POSITION,
        Some(b';') => c.kind |= PacketKind::OBJECT,
        Some(b')') => c.kind |= PacketKind::ITEM,
        Some(b'>') => c.kind |= PacketKind::STATUS,
        Some(b'_') => c.kind |= PacketKind::WX,
        Some(b'T') => c.kind |= PacketKind::TELEMETRY,
        Some(b'?') => c.kind |= PacketKind::QUERY,
        Some(b'{') => c.kind |= PacketKind::USERDEF,
        _ => {}
    }
}

/// The 9-character addressee of a `:ADDRESSEE:text` message, trimmed.
fn message_addressee(info: &[u8]) -> Option<&str> {
    if info.len() < NAME_MAX + 2 || info[0] != b':' || info[NAME_MAX + 1] != b':' {
        return None;
    }
    let addressee = core::str::from_utf8(&info[1..=NAME_MAX]).ok()?.trim_end();
    (!addressee.is_empty()).then_some(addressee)
}

/// Parse an APRS message information field.
///
/// `ack` and `rej` replies carry the acknowledged id as `msgid`. A trailing
/// reply-ack suffix (`{MM}AA`) is stripped down to the `MM` part.
pub fn parse_message(info: &[u8]) -> Option<AprsMessage> {
    let addressee = message_addressee(info)?.to_owned();
    let body = &info[NAME_MAX + 2..];

    for (prefix, is_ack) in [(&b"ack"[..], true), (&b"rej"[..], false)] {
        if let Some(id) = body.strip_prefix(prefix) {
            let id = lossy(id).trim().to_owned();
            return Some(AprsMessage {
                addressee,
                text: String::new(),
                msgid: (!id.is_empty()).then_some(id),
                is_ack,
                is_rej: !is_ack,
            });
        }
    }

    let (text, msgid) = match body.iter().rposition(|&b| b == b'{') {
        Some(brace) => {
            let id = &body[brace + 1..];
            let id = match find(id, b'}') {
                Some(end) => &id[..end],
                None => id,
            };
            let id = lossy(id).trim().to_owned();
            (&body[..brace], (!id.is_empty()).then_some(id))
        }
        None => (body, None),
    };

    Some(AprsMessage {
        addressee,
        text: lossy(text),
        msgid,
        is_ack: false,
        is_rej: false,
    })
}

/// True when a third-party information field (starting at `}`) carries an
/// inner path with `TCPIP*` or `TCPXX*`, i.e. the packet was gated from
/// the Internet.
pub fn is_gated_from_internet(info: &[u8]) -> bool {
    let Some(inner) = info.strip_prefix(&[DTI_THIRDPARTY]) else {
        return false;
    };
    let header = match find(inner, TNC2_INFO_SEP) {
        Some(colon) => &inner[..colon],
        None => inner,
    };
    INTERNET_MARKERS
        .iter()
        .any(|marker| header.windows(marker.len()).any(|w| w == *marker))
}

/// Station part of a message addressee: up to nine characters, stopping at
/// the first space.
pub fn recipient_name(dst_name: &str) -> &str {
    let limit = dst_name
        .char_indices()
        .nth(NAME_MAX)
        .map_or(dst_name.len(), |(i, _)| i);
    let head = &dst_name[..limit];
    head.split(' ').next().unwrap_or(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_text(text: &str) -> Classification {
        let addr_len = text.find(':').unwrap();
        classify(text.as_bytes(), addr_len)
    }

    #[test]
    fn classify_message() {
        let c = classify_text("OH2ABC>APRS,TCPIP*::N0CALL   :hello{42");
        assert!(c.kind.contains(PacketKind::MESSAGE));
        assert_eq!(c.src_name.as_deref(), Some("OH2ABC"));
        assert_eq!(c.dst_name.as_deref(), Some("N0CALL"));
        assert_eq!(c.info_offset, Some(19));
    }

    #[test]
    fn classify_nws_bulletin() {
        let c = classify_text("NWSBOT>APRS::NWS-WARN :tornado");
        assert!(c.kind.contains(PacketKind::MESSAGE | PacketKind::NWS));
        assert_eq!(c.dst_name.as_deref(), Some("NWS-WARN"));
    }

    #[test]
    fn classify_general_bulletin_has_no_recipient() {
        let c = classify_text("N0CALL>APRS::BLN1     :club meeting");
        assert!(c.kind.contains(PacketKind::MESSAGE | PacketKind::BULLETIN));
        assert_eq!(c.dst_name, None);
    }

    #[test]
    fn classify_position_and_status() {
        assert_eq!(
            classify_text("N0CALL>APRS:!6028.51N/02505.68E#").kind,
            PacketKind::POSITION
        );
        assert_eq!(classify_text("N0CALL>APRS:>on the air").kind, PacketKind::STATUS);
        assert_eq!(classify_text("N0CALL>APRS:;OBJ      *").kind, PacketKind::OBJECT);
        assert!(classify_text("N0CALL>APRS:plain text").kind.is_empty());
    }

    #[test]
    fn classify_third_party_unwraps_inner() {
        let c = classify_text("OH2GW>APRS,WIDE1-1:}OH2ABC>APRS,TCPIP,OH2GW*::N0CALL   :hi");
        assert!(c.kind.contains(PacketKind::THIRDPARTY | PacketKind::MESSAGE));
        assert_eq!(c.src_name.as_deref(), Some("OH2ABC"));
        assert_eq!(c.dst_name.as_deref(), Some("N0CALL"));
    }

    #[test]
    fn classify_malformed_message_is_not_message() {
        let c = classify_text("N0CALL>APRS::SHORT:x");
        assert!(!c.kind.contains(PacketKind::MESSAGE));
    }

    #[test]
    fn parse_message_with_id() {
        let msg = parse_message(b":N0CALL-1 :hello there{42").unwrap();
        assert_eq!(msg.addressee, "N0CALL-1");
        assert_eq!(msg.text, "hello there");
        assert_eq!(msg.msgid.as_deref(), Some("42"));
        assert!(!msg.is_ack && !msg.is_rej);
    }

    #[test]
    fn parse_message_reply_ack_suffix() {
        let msg = parse_message(b":N0CALL   :hi{AB}CD").unwrap();
        assert_eq!(msg.msgid.as_deref(), Some("AB"));
    }

    #[test]
    fn parse_ack_and_rej() {
        let ack = parse_message(b":N0CALL   :ack42").unwrap();
        assert!(ack.is_ack);
        assert_eq!(ack.msgid.as_deref(), Some("42"));
        let rej = parse_message(b":N0CALL   :rej7").unwrap();
        assert!(rej.is_rej);
        assert!(!rej.is_ack);
    }

    #[test]
    fn parse_message_without_id() {
        let msg = parse_message(b":N0CALL   :no id here").unwrap();
        assert_eq!(msg.msgid, None);
        assert!(parse_message(b"!not a message").is_none());
        assert!(parse_message(b":         :empty addressee").is_none());
    }

    #[test]
    fn internet_marker_detection() {
        assert!(is_gated_from_internet(b"}OH2ABC>APRS,TCPIP*,OH2GW*:>hi"));
        assert!(is_gated_from_internet(b"}OH2ABC>APRS,TCPXX*:>hi"));
        assert!(!is_gated_from_internet(b"}OH2ABC>APRS,WIDE1-1:>x,TCPIP*"));
        assert!(!is_gated_from_internet(b">status"));
    }

    #[test]
    fn recipient_name_stops_at_space_and_width() {
        assert_eq!(recipient_name("N0CALL-15"), "N0CALL-15");
        assert_eq!(recipient_name("N0CALL X"), "N0CALL");
        assert_eq!(recipient_name("ABCDEFGHIJK"), "ABCDEFGHI");
    }
}
