//! End-to-end tests for RF dispatch, Tx-IGate gating, self-addressed
//! messages and beacons.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use digigate_core::address::Ax25Address;
use digigate_core::error::{AddressError, FrameError};
use digigate_core::frame::ReceivedFrame;
use digigate_core::frame::header::AddressHeader;
use digigate_core::framing::kiss::{kiss_frame, kiss_unframe};
use digigate_core::packet::buffer::PacketBuffer;
use digigate_core::packet::kind::PacketKind;
use digigate_transport::dedup::DupeStore;
use digigate_transport::router::{
    AckOutcome, BeaconOutcome, RfDirection, SelfMessageOutcome, SelfTarget,
};
use digigate_transport::{
    AprsParser, BasicAprsParser, BeaconError, Digipeater, DigipeaterId, DigipeaterSource,
    FilterVerdict, GateError, Gateway, HistoryDb, HistoryEntry, InterfaceIndex,
    InterfaceKind, InterfaceRegistry, InterfaceSpec, MemoryHistory, RouterAction, SourceFilter,
    StationIdentity, Transport, TransportError,
};

const NOW: u64 = 1_700_000_000;
const MYCALL: &str = "OH7LZB";
const TX_CALL: &str = "N0CALL-1";
const SERIAL_DEV: &str = "/dev/ttyS0";

// ---------------------------------------------------------------------------
// Collaborator stubs
// ---------------------------------------------------------------------------

/// History store that counts `insert_heard` calls.
struct CountingHistory {
    inner: MemoryHistory,
    inserts: Rc<Cell<usize>>,
}

impl HistoryDb for CountingHistory {
    fn insert_heard(&mut self, packet: &PacketBuffer) -> bool {
        self.inserts.set(self.inserts.get() + 1);
        self.inner.insert_heard(packet)
    }

    fn mark_heard_via_internet(&mut self, callsign: &str, at: u64) {
        self.inner.mark_heard_via_internet(callsign, at);
    }

    fn lookup(&self, callsign: &str) -> Option<&HistoryEntry> {
        self.inner.lookup(callsign)
    }
}

struct FixedFilter(FilterVerdict);

impl SourceFilter for FixedFilter {
    fn evaluate(&self, _packet: &PacketBuffer, _history: &dyn HistoryDb) -> FilterVerdict {
        self.0
    }
}

#[derive(Default)]
struct CaptureTransport {
    sent: RefCell<Vec<Vec<u8>>>,
}

impl Transport for CaptureTransport {
    fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        self.sent.borrow_mut().push(frame.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct Station {
    gateway: Gateway,
    radio: InterfaceIndex,
    digi: DigipeaterId,
    inserts: Rc<Cell<usize>>,
    transport: Rc<CaptureTransport>,
}

/// One transmitting serial KISS radio at group 1 with a digipeater whose
/// history is pre-seeded by `seed`.
fn station_with(seed: impl FnOnce(&mut MemoryHistory)) -> Station {
    let mut registry = InterfaceRegistry::new();
    let radio = registry
        .register(
            InterfaceSpec::new(
                TX_CALL,
                InterfaceKind::SerialKiss {
                    device: SERIAL_DEV.into(),
                    port: 0,
                },
            )
            .transmitting(true),
        )
        .unwrap();
    let transport = Rc::new(CaptureTransport::default());
    registry.attach_transport(radio, transport.clone()).unwrap();

    let mut history = MemoryHistory::new();
    seed(&mut history);
    let inserts = Rc::new(Cell::new(0));
    let digipeater = Digipeater::new(
        radio,
        Box::new(CountingHistory {
            inner: history,
            inserts: inserts.clone(),
        }),
        Box::new(DupeStore::new()),
    );

    let identity = StationIdentity::new(MYCALL).with_aprsis_login("OH7LZB-10");
    let mut gateway = Gateway::new(identity, registry);
    let digi = gateway.add_digipeater(digipeater).unwrap();
    Station {
        gateway,
        radio,
        digi,
        inserts,
        transport,
    }
}

fn station() -> Station {
    station_with(|_| {})
}

fn aprsis() -> InterfaceIndex {
    InterfaceIndex(0)
}

/// Attach an APRS-IS source to the station's digipeater, configured by
/// `build`.
fn attach_aprsis_source(
    st: &mut Station,
    build: impl FnOnce(DigipeaterSource) -> DigipeaterSource,
) {
    let source = build(DigipeaterSource::new(st.digi));
    st.gateway.attach_source(aprsis(), source).unwrap();
}

fn ui_frame(src: &str, dest: &str, vias: &[&str], info: &[u8]) -> Vec<u8> {
    let header = AddressHeader::from_text(dest, src, vias).unwrap();
    let mut raw = header.encode();
    raw.extend_from_slice(&[0x03, 0xF0]);
    raw.extend_from_slice(info);
    raw
}

fn heard(text: &str) -> ReceivedFrame {
    let (src, rest) = text.split_once('>').unwrap();
    let (path, info) = rest.split_once(':').unwrap();
    let mut heads = path.split(',');
    let dest = heads.next().unwrap();
    let vias: Vec<&str> = heads.collect();
    ReceivedFrame::from_ax25(&ui_frame(src, dest, &vias, info.as_bytes())).unwrap()
}

fn digipeats(actions: &[RouterAction]) -> Vec<&PacketBuffer> {
    actions
        .iter()
        .filter_map(|a| match a {
            RouterAction::Digipeat { packet, .. } => Some(packet),
            _ => None,
        })
        .collect()
}

fn aprsis_lines(actions: &[RouterAction]) -> Vec<String> {
    actions
        .iter()
        .filter_map(|a| match a {
            RouterAction::QueueAprsIs(line) => Some(line.to_string()),
            _ => None,
        })
        .collect()
}

const APRSIS_HEADS: [&str; 5] = ["KC1XYZ", "APRS", "TCPIP*", "qAC", "T2FINLAND"];

fn gate(st: &mut Station, payload: &[u8]) -> Vec<RouterAction> {
    st.gateway
        .receive_thirdparty(aprsis(), &APRSIS_HEADS, "TCPIP", payload, NOW)
        .unwrap()
}

fn recipient_heard_on_rf(history: &mut MemoryHistory) {
    history.record("N0CALL", 1, NOW - 600);
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[test]
fn registry_groups_follow_registration_order() {
    let mut registry = InterfaceRegistry::new();
    let a = registry
        .register(InterfaceSpec::new("N0CALL-1", InterfaceKind::Null))
        .unwrap();
    let b = registry
        .register(InterfaceSpec::new("N0CALL-2", InterfaceKind::Null))
        .unwrap();
    assert_eq!(registry.aprsis().group(), 0);
    assert_eq!(registry.get(a).unwrap().group(), 1);
    assert_eq!(registry.get(b).unwrap().group(), 2);
    assert_eq!(
        registry.find_by_callsign("n0call-2").unwrap().index(),
        b
    );
    assert!(registry.find_by_callsign("N0CALL-3").is_none());
}

#[test]
fn digipeater_transmitter_must_transmit() {
    let mut registry = InterfaceRegistry::new();
    let rx_only = registry
        .register(InterfaceSpec::new("N0CALL-1", InterfaceKind::Null))
        .unwrap();
    let mut gateway = Gateway::new(StationIdentity::new(MYCALL), registry);
    let err = gateway
        .add_digipeater(Digipeater::with_memory_stores(rx_only))
        .unwrap_err();
    assert!(matches!(
        err,
        digigate_transport::RegistryError::NotTransmitter(_)
    ));
}

#[test]
fn attach_source_rejects_unknown_digipeater() {
    let mut st = station();
    let err = st
        .gateway
        .attach_source(st.radio, DigipeaterSource::new(DigipeaterId(7)))
        .unwrap_err();
    assert!(matches!(
        err,
        digigate_transport::RegistryError::UnknownDigipeater(7)
    ));
}

// ---------------------------------------------------------------------------
// RF dispatch
// ---------------------------------------------------------------------------

#[test]
fn zero_source_non_aprs_frame_leaves_history_alone() {
    let mut st = station();
    let raw = {
        let mut raw = AddressHeader::from_text("APRS", "KC1XYZ", &[]).unwrap().encode();
        raw.extend_from_slice(&[0x03, 0xCF]);
        raw.extend_from_slice(b"netrom");
        raw
    };
    let frame = ReceivedFrame::from_ax25(&raw).unwrap();
    assert!(!frame.is_aprs);

    let actions = st.gateway.receive_ax25(st.radio, &frame, NOW).unwrap();
    assert!(actions.is_empty());
    assert_eq!(st.inserts.get(), 0);
}

#[test]
fn zero_source_aprs_frame_is_recorded_once_and_not_forwarded() {
    let mut st = station();
    let frame = heard("KC1XYZ>APRS,WIDE1-1:!6028.51N/02505.68E#");

    let actions = st.gateway.receive_ax25(st.radio, &frame, NOW).unwrap();
    assert!(actions.is_empty());
    assert_eq!(st.inserts.get(), 1);
    let history = st.gateway.digipeater(st.digi).unwrap().history();
    assert_eq!(history.lookup("KC1XYZ").unwrap().last_heard(1), Some(NOW));
}

#[test]
fn each_source_gets_its_own_packet() {
    let mut st = station();
    st.gateway
        .attach_source(st.radio, DigipeaterSource::new(st.digi))
        .unwrap();
    st.gateway
        .attach_source(st.radio, DigipeaterSource::new(st.digi))
        .unwrap();

    let frame = heard("KC1XYZ>APRS,WIDE1-1:>status");
    let actions = st.gateway.receive_ax25(st.radio, &frame, NOW).unwrap();

    let packets = digipeats(&actions);
    assert_eq!(packets.len(), 2);
    for pb in packets {
        assert_eq!(pb.source_if_group(), 1);
        assert!(pb.kind().contains(PacketKind::STATUS));
        assert!(pb.digi_like_aprs());
    }
    assert_eq!(st.inserts.get(), 2);
}

#[test]
fn rejecting_filter_skips_only_its_source() {
    let mut st = station();
    st.gateway
        .attach_source(
            st.radio,
            DigipeaterSource::new(st.digi)
                .with_filter(Box::new(FixedFilter(FilterVerdict::Reject))),
        )
        .unwrap();
    st.gateway
        .attach_source(st.radio, DigipeaterSource::new(st.digi))
        .unwrap();

    let frame = heard("KC1XYZ>APRS:>status");
    let actions = st.gateway.receive_ax25(st.radio, &frame, NOW).unwrap();
    assert_eq!(digipeats(&actions).len(), 1);
    assert_eq!(st.inserts.get(), 1);
}

#[test]
fn short_address_header_is_rejected() {
    let mut st = station();
    st.gateway
        .attach_source(st.radio, DigipeaterSource::new(st.digi))
        .unwrap();
    let mut frame = heard("KC1XYZ>APRS:>status");
    frame.ax25_addr_len = 7;

    let err = st.gateway.receive_ax25(st.radio, &frame, NOW).unwrap_err();
    assert!(matches!(
        err,
        GateError::Frame(FrameError::ShortAddressHeader { len: 7 })
    ));
}

#[test]
fn oversized_frame_is_skipped_per_source() {
    let mut st = station();
    st.gateway
        .attach_source(st.radio, DigipeaterSource::new(st.digi))
        .unwrap();
    let info = vec![b'x'; 1200];
    let raw = ui_frame("KC1XYZ", "APRS", &[], &info);
    let frame = ReceivedFrame::from_ax25(&raw).unwrap();

    let actions = st.gateway.receive_ax25(st.radio, &frame, NOW).unwrap();
    assert!(actions.is_empty());
}

#[test]
fn rf_thirdparty_from_internet_marks_inner_source() {
    let mut st = station();
    st.gateway
        .attach_source(st.radio, DigipeaterSource::new(st.digi))
        .unwrap();
    let frame = heard("N0CALL-5>APRS,WIDE1-1:}KC1XYZ>APRS,TCPIP*:>via the net");

    st.gateway.receive_ax25(st.radio, &frame, NOW).unwrap();

    let history = st.gateway.digipeater(st.digi).unwrap().history();
    let entry = history.lookup("KC1XYZ").unwrap();
    assert_eq!(entry.last_heard(0), Some(NOW));
}

#[test]
fn rf_thirdparty_relay_leaves_history_untouched() {
    let mut st = station();
    st.gateway
        .attach_source(st.radio, DigipeaterSource::new(st.digi))
        .unwrap();
    let frame = heard("N0CALL-5>APRS,WIDE1-1:}KC1XYZ>APRS,WIDE2-1:>plain relay");

    let actions = st.gateway.receive_ax25(st.radio, &frame, NOW).unwrap();
    assert_eq!(digipeats(&actions).len(), 1);

    let history = st.gateway.digipeater(st.digi).unwrap().history();
    assert!(history.lookup("KC1XYZ").is_none());
    assert!(history.lookup("N0CALL-5").is_none());
    assert_eq!(st.inserts.get(), 0);
}

#[test]
fn oversized_frame_without_sources_is_dropped() {
    let mut st = station();
    let raw = ui_frame("KC1XYZ", "APRS", &[], &vec![b'x'; 1200]);
    let frame = ReceivedFrame::from_ax25(&raw).unwrap();
    assert!(frame.is_aprs);

    let actions = st.gateway.receive_ax25(st.radio, &frame, NOW).unwrap();
    assert!(actions.is_empty());
    assert_eq!(st.inserts.get(), 0);
}

#[test]
fn kiss_frames_are_routed_by_port() {
    let mut st = station();
    st.gateway
        .attach_source(st.radio, DigipeaterSource::new(st.digi))
        .unwrap();
    let raw = ui_frame("KC1XYZ", "APRS", &["WIDE1-1"], b">status");

    let actions = st
        .gateway
        .receive_kiss(SERIAL_DEV, &kiss_frame(0, &raw), NOW)
        .unwrap();
    assert_eq!(digipeats(&actions).len(), 1);
    let rx = st.gateway.registry().get(st.radio).unwrap().counters().snapshot();
    assert_eq!(rx.rx_frames, 1);
    assert_eq!(rx.rx_bytes, raw.len() as u64);

    let err = st
        .gateway
        .receive_kiss(SERIAL_DEV, &kiss_frame(3, &raw), NOW)
        .unwrap_err();
    assert!(matches!(err, GateError::UnknownKissPort { port: 3, .. }));
}

// ---------------------------------------------------------------------------
// Tx-IGate gating
// ---------------------------------------------------------------------------

#[test]
fn message_to_unknown_recipient_is_not_gated() {
    let mut st = station();
    attach_aprsis_source(&mut st, |s| s);

    let actions = gate(&mut st, b":N0CALL   :hello{1");
    assert!(digipeats(&actions).is_empty());
}

#[test]
fn message_to_recent_rf_recipient_is_gated() {
    let mut st = station_with(recipient_heard_on_rf);
    attach_aprsis_source(&mut st, |s| s);

    let actions = gate(&mut st, b":N0CALL   :hello{1");
    let packets = digipeats(&actions);
    assert_eq!(packets.len(), 1);

    let pb = packets[0];
    assert_eq!(pb.source_if_group(), 0);
    assert_eq!(
        pb.tnc2(),
        b"KC1XYZ>APRS,TCPIP*,qAC,T2FINLAND:}KC1XYZ>APRS,TCPIP,N0CALL-1*::N0CALL   :hello{1"
    );
    let (header, len) = AddressHeader::parse(pb.ax25()).unwrap();
    assert_eq!(header.dest().callsign(), "APRS");
    assert_eq!(header.src().callsign(), TX_CALL);
    assert!(header.vias().is_empty());
    assert_eq!(
        &pb.ax25()[len..],
        b"\x03\xf0}KC1XYZ>APRS,TCPIP,N0CALL-1*::N0CALL   :hello{1"
    );
}

#[test]
fn gated_message_uses_message_via_path() {
    let mut st = station_with(recipient_heard_on_rf);
    attach_aprsis_source(
        &mut st,
        |s| s
            .with_via_path(Ax25Address::parse("WIDE2-2").unwrap())
            .with_msg_via_path(Ax25Address::parse("WIDE1-1").unwrap()),
    );

    let actions = gate(&mut st, b":N0CALL   :hello{1");
    let pb = digipeats(&actions)[0];
    let (header, _) = AddressHeader::parse(pb.ax25()).unwrap();
    assert_eq!(header.vias().len(), 1);
    assert_eq!(header.vias()[0].callsign(), "WIDE1-1");
    assert!(header.vias()[0].is_last());
}

#[test]
fn recipient_heard_on_internet_is_not_gated() {
    let mut st = station_with(|h| {
        h.record("N0CALL", 1, NOW - 600);
        h.record("N0CALL", 0, NOW - 60);
    });
    attach_aprsis_source(&mut st, |s| s);

    assert!(digipeats(&gate(&mut st, b":N0CALL   :hello{1")).is_empty());
}

#[test]
fn sender_heard_on_rf_is_not_gated() {
    let mut st = station_with(|h| {
        h.record("N0CALL", 1, NOW - 600);
        h.record("KC1XYZ", 1, NOW - 120);
    });
    attach_aprsis_source(&mut st, |s| s);

    assert!(digipeats(&gate(&mut st, b":N0CALL   :hello{1")).is_empty());
}

#[test]
fn stale_history_still_gates() {
    let mut st = station_with(|h| {
        h.record("N0CALL", 1, NOW - 600);
        h.record("N0CALL", 0, NOW - 3600);
        h.record("KC1XYZ", 1, NOW - 7200);
    });
    attach_aprsis_source(&mut st, |s| s);

    assert_eq!(digipeats(&gate(&mut st, b":N0CALL   :hello{1")).len(), 1);
}

#[test]
fn filter_reject_overrides_default_policy() {
    let mut st = station_with(recipient_heard_on_rf);
    attach_aprsis_source(
        &mut st,
        |s| s.with_filter(Box::new(FixedFilter(FilterVerdict::Reject))),
    );

    assert!(digipeats(&gate(&mut st, b":N0CALL   :hello{1")).is_empty());
}

#[test]
fn filter_accept_overrides_unknown_recipient() {
    let mut st = station();
    attach_aprsis_source(
        &mut st,
        |s| s.with_filter(Box::new(FixedFilter(FilterVerdict::Accept))),
    );

    assert_eq!(digipeats(&gate(&mut st, b":N0CALL   :hello{1")).len(), 1);
}

#[test]
fn filter_accept_does_not_gate_non_messages() {
    let mut st = station_with(recipient_heard_on_rf);
    attach_aprsis_source(
        &mut st,
        |s| s.with_filter(Box::new(FixedFilter(FilterVerdict::Accept))),
    );

    assert!(digipeats(&gate(&mut st, b"!6028.51N/02505.68E#")).is_empty());
}

#[test]
fn filter_accept_does_not_gate_weather_alerts() {
    let mut st = station_with(|h| {
        h.record("NWS-WARN", 1, NOW - 60);
    });
    attach_aprsis_source(
        &mut st,
        |s| s.with_filter(Box::new(FixedFilter(FilterVerdict::Accept))),
    );

    assert!(digipeats(&gate(&mut st, b":NWS-WARN :tornado warning")).is_empty());
}

#[test]
fn history_is_updated_whatever_the_decision() {
    let mut st = station();
    attach_aprsis_source(&mut st, |s| s);

    assert!(digipeats(&gate(&mut st, b":N0CALL   :hello{1")).is_empty());
    assert_eq!(st.inserts.get(), 1);
    let history = st.gateway.digipeater(st.digi).unwrap().history();
    assert_eq!(history.lookup("KC1XYZ").unwrap().last_heard(0), Some(NOW));
}

#[test]
fn filtered_source_records_history_before_and_after() {
    let mut st = station();
    attach_aprsis_source(
        &mut st,
        |s| s
            .with_filter(Box::new(FixedFilter(FilterVerdict::Indifferent))),
    );

    gate(&mut st, b":N0CALL   :hello{1");
    assert_eq!(st.inserts.get(), 2);
}

#[test]
fn thirdparty_needs_source_and_destination() {
    let mut st = station();
    let err = st
        .gateway
        .receive_thirdparty(aprsis(), &["KC1XYZ"], "TCPIP", b">x", NOW)
        .unwrap_err();
    assert!(matches!(err, GateError::IncompleteHeads(1)));
}

// ---------------------------------------------------------------------------
// Messages to self
// ---------------------------------------------------------------------------

#[test]
fn message_to_self_is_acknowledged_on_aprsis() {
    let mut st = station_with(|h| {
        h.record(MYCALL, 1, NOW - 60);
    });
    attach_aprsis_source(&mut st, |s| s);

    let actions = gate(&mut st, b":OH7LZB   :hello{42");

    assert!(digipeats(&actions).is_empty());
    assert_eq!(
        aprsis_lines(&actions),
        vec!["OH7LZB>APRS,TCPIP*::KC1XYZ   :ack42".to_owned()]
    );
    let login = actions.iter().find_map(|a| match a {
        RouterAction::QueueAprsIs(line) => line.login.clone(),
        _ => None,
    });
    assert_eq!(login.as_deref(), Some("OH7LZB-10"));
    let rflog = actions.iter().find_map(|a| match a {
        RouterAction::RfLog(rec) => Some(rec),
        _ => None,
    });
    assert_eq!(rflog.unwrap().direction, RfDirection::ToAprsIs);
    assert_eq!(st.inserts.get(), 0);
}

#[test]
fn ack_to_self_is_not_acknowledged() {
    let mut st = station();
    attach_aprsis_source(&mut st, |s| s);

    let actions = gate(&mut st, b":OH7LZB   :ack42");
    assert!(actions.is_empty());

    let actions = gate(&mut st, b":OH7LZB   :rej42");
    assert!(actions.is_empty());
}

#[test]
fn message_without_id_is_consumed_silently() {
    let mut st = station();
    let actions = gate(&mut st, b":OH7LZB-10:hello");
    assert!(actions.is_empty());
}

fn classified(text: &str) -> PacketBuffer {
    let frame = heard(text);
    let mut pb = PacketBuffer::new(&frame, true, NOW).unwrap();
    BasicAprsParser.parse(&mut pb, None);
    pb
}

#[test]
fn identities_resolve_to_targets() {
    let st = station();
    let gw = &st.gateway;
    assert_eq!(
        gw.is_addressed_to_self(&classified("KC1XYZ>APRS::OH7LZB   :hi{1")),
        Some(SelfTarget::PrimaryIdentity)
    );
    assert_eq!(
        gw.is_addressed_to_self(&classified("KC1XYZ>APRS::OH7LZB-10:hi{1")),
        Some(SelfTarget::AprsIsLogin)
    );
    assert_eq!(
        gw.is_addressed_to_self(&classified("KC1XYZ>APRS::n0call-1 :hi{1")),
        Some(SelfTarget::Interface(st.radio))
    );
    assert_eq!(
        gw.is_addressed_to_self(&classified("KC1XYZ>APRS::OH2ABC   :hi{1")),
        None
    );
}

#[test]
fn radio_message_to_self_is_not_acknowledged() {
    let st = station();
    let pb = classified("KC1XYZ>APRS::OH7LZB   :hi{9");
    let mut actions = Vec::new();

    let outcome = st
        .gateway
        .process_message_to_self(st.radio, &pb, &mut actions);
    assert_eq!(
        outcome,
        SelfMessageOutcome::Acknowledged(AckOutcome::RadioUnsupported)
    );
    assert!(outcome.handled());
    assert!(actions.is_empty());
}

#[test]
fn non_message_is_not_handled() {
    let st = station();
    let pb = classified("KC1XYZ>APRS:>status");
    let mut actions = Vec::new();
    let outcome = st
        .gateway
        .process_message_to_self(aprsis(), &pb, &mut actions);
    assert_eq!(outcome, SelfMessageOutcome::NotMessage);
    assert!(!outcome.handled());
}

// ---------------------------------------------------------------------------
// Beacons
// ---------------------------------------------------------------------------

const BEACON: &[u8] = b"\x03\xf0!6028.51N/02505.68E#digigate";

#[test]
fn beacon_is_registered_then_sent() {
    let mut st = station();
    let outcome = st
        .gateway
        .transmit_beacon(Some(st.radio), TX_CALL, "APRS", Some("WIDE1-1"), BEACON)
        .unwrap();

    let BeaconOutcome::Sent { rflog } = outcome else {
        panic!("beacon not sent");
    };
    assert_eq!(
        rflog.to_string(),
        "N0CALL-1 T N0CALL-1>APRS,WIDE1-1:!6028.51N/02505.68E#digigate"
    );

    let sent = st.transport.sent.borrow();
    assert_eq!(sent.len(), 1);
    let kiss = kiss_unframe(&sent[0]).unwrap();
    assert_eq!(kiss.port, 0);
    let (header, len) = AddressHeader::parse(&kiss.data).unwrap();
    assert_eq!(header.vias()[0].callsign(), "WIDE1-1");
    assert_eq!(&kiss.data[len..], BEACON);

    let digi = st.gateway.digipeater(st.digi).unwrap();
    assert!(
        digi.dupes()
            .is_duplicate(b"N0CALL-1>APRS,WIDE1-1", &BEACON[2..])
    );
}

#[test]
fn beacon_with_too_many_vias_is_not_sent() {
    let mut st = station();
    let via = "A,B,C,D,E,F,G,H,I";
    let err = st
        .gateway
        .transmit_beacon(Some(st.radio), TX_CALL, "APRS", Some(via), BEACON)
        .unwrap_err();

    assert!(matches!(
        err,
        BeaconError::Address(AddressError::TooManyVia { .. })
    ));
    assert!(st.transport.sent.borrow().is_empty());
    let address = format!("{TX_CALL}>APRS,{via}");
    let digi = st.gateway.digipeater(st.digi).unwrap();
    assert!(!digi.dupes().is_duplicate(address.as_bytes(), &BEACON[2..]));
}

#[test]
fn beacon_with_empty_via_token_is_not_sent() {
    let mut st = station();
    let err = st
        .gateway
        .transmit_beacon(
            Some(st.radio),
            TX_CALL,
            "APRS",
            Some("WIDE1-1,,WIDE2-1"),
            BEACON,
        )
        .unwrap_err();
    assert!(matches!(err, BeaconError::EmptyVia(_)));
    assert!(st.transport.sent.borrow().is_empty());
}

#[test]
fn beacon_on_missing_or_receive_only_interface_is_not_applicable() {
    let mut registry = InterfaceRegistry::new();
    let rx_only = registry
        .register(InterfaceSpec::new("N0CALL-2", InterfaceKind::Null))
        .unwrap();
    let mut gateway = Gateway::new(StationIdentity::new(MYCALL), registry);

    assert_eq!(
        gateway
            .transmit_beacon(None, TX_CALL, "APRS", None, BEACON)
            .unwrap(),
        BeaconOutcome::NotApplicable
    );
    assert_eq!(
        gateway
            .transmit_beacon(Some(rx_only), TX_CALL, "APRS", None, BEACON)
            .unwrap(),
        BeaconOutcome::NotApplicable
    );
}

#[test]
fn beacon_with_invalid_source_fails() {
    let mut st = station();
    let err = st
        .gateway
        .transmit_beacon(Some(st.radio), "BAD_CALL", "APRS", None, BEACON)
        .unwrap_err();
    assert!(matches!(
        err,
        BeaconError::Address(AddressError::InvalidCallsign(_))
    ));
}
