//! Pure Tx-IGate gating decisions.
//!
//! Decides whether a frame arriving from APRS-IS may be transmitted on one
//! RF interface. Kept free of I/O and stores so that each rule can be
//! tested in isolation.
//!
//! Rule order:
//! 1. Only directed messages with a recipient are eligible, and never
//!    weather-service bulletins. A filter cannot override this.
//! 2. A filter `Reject` discards.
//! 3. A filter `Accept` forwards, skipping the recency rules.
//! 4. The recipient must be known to the history store.
//! 5. A recipient heard via APRS-IS within the window is reachable there.
//! 6. A sender heard on the target RF group within the window is already
//!    on that RF network.

use digigate_core::packet::kind::PacketKind;

use crate::history::HistoryEntry;
use crate::interface::APRSIS_GROUP;
use crate::router::constants::RECENT_WINDOW;
use crate::services::FilterVerdict;

/// Outcome of the gating rules for one target interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Forward { reason: ForwardReason },
    Discard { reason: DiscardReason },
}

impl GateDecision {
    pub fn is_forward(&self) -> bool {
        matches!(self, GateDecision::Forward { .. })
    }
}

/// Why a packet was gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardReason {
    FilterAccepted,
    DefaultPolicy,
}

/// Why a packet was not gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    NotMessage,
    NoRecipient,
    WeatherAlert,
    FilterRejected,
    RecipientUnknown,
    RecipientOnInternet,
    SenderOnRf,
}

/// Everything the gating rules look at for one target interface.
#[derive(Debug, Clone, Copy)]
pub struct GateInputs<'a> {
    pub kind: PacketKind,
    pub has_recipient: bool,
    pub verdict: FilterVerdict,
    pub recipient: Option<&'a HistoryEntry>,
    pub sender: Option<&'a HistoryEntry>,
    pub tx_group: u16,
    pub now: u64,
}

fn discard(reason: DiscardReason) -> GateDecision {
    GateDecision::Discard { reason }
}

/// Apply the Internet-to-RF gating rules.
///
/// Type checks come first and cannot be overridden. A filter verdict then
/// rejects or accepts outright. Otherwise the recipient must be known, not
/// recently active on APRS-IS, and the sender must not be recently heard on
/// the target group.
#[must_use]
pub fn decide_gate(inputs: &GateInputs<'_>) -> GateDecision {
    if !inputs.kind.contains(PacketKind::MESSAGE) {
        return discard(DiscardReason::NotMessage);
    }
    if !inputs.has_recipient {
        return discard(DiscardReason::NoRecipient);
    }
    if inputs.kind.contains(PacketKind::NWS) {
        return discard(DiscardReason::WeatherAlert);
    }

    match inputs.verdict {
        FilterVerdict::Reject => return discard(DiscardReason::FilterRejected),
        FilterVerdict::Accept => {
            return GateDecision::Forward {
                reason: ForwardReason::FilterAccepted,
            };
        }
        FilterVerdict::Indifferent => {}
    }

    let recent = inputs.now.saturating_sub(RECENT_WINDOW);
    let Some(recipient) = inputs.recipient else {
        return discard(DiscardReason::RecipientUnknown);
    };
    if recipient.heard_since(APRSIS_GROUP, recent) {
        return discard(DiscardReason::RecipientOnInternet);
    }
    if inputs
        .sender
        .is_some_and(|s| s.heard_since(inputs.tx_group, recent))
    {
        return discard(DiscardReason::SenderOnRf);
    }

    GateDecision::Forward {
        reason: ForwardReason::DefaultPolicy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn entry(group: u16, ago: u64) -> HistoryEntry {
        let mut e = HistoryEntry::new("X");
        e.mark_heard(group, NOW - ago);
        e
    }

    fn inputs<'a>(
        verdict: FilterVerdict,
        recipient: Option<&'a HistoryEntry>,
        sender: Option<&'a HistoryEntry>,
    ) -> GateInputs<'a> {
        GateInputs {
            kind: PacketKind::MESSAGE,
            has_recipient: true,
            verdict,
            recipient,
            sender,
            tx_group: 1,
            now: NOW,
        }
    }

    #[test]
    fn recent_rf_recipient_and_unknown_sender_forwards() {
        let n0call = entry(1, 600);
        let d = decide_gate(&inputs(FilterVerdict::Indifferent, Some(&n0call), None));
        assert_eq!(
            d,
            GateDecision::Forward {
                reason: ForwardReason::DefaultPolicy
            }
        );
    }

    #[test]
    fn unknown_recipient_discards() {
        let d = decide_gate(&inputs(FilterVerdict::Indifferent, None, None));
        assert_eq!(d, discard(DiscardReason::RecipientUnknown));
    }

    #[test]
    fn stale_recipient_still_forwards() {
        let old = entry(1, RECENT_WINDOW * 5);
        let d = decide_gate(&inputs(FilterVerdict::Indifferent, Some(&old), None));
        assert!(d.is_forward());
    }

    #[test]
    fn recipient_on_internet_discards() {
        let mut r = entry(1, 60);
        r.mark_heard(APRSIS_GROUP, NOW - 60);
        let d = decide_gate(&inputs(FilterVerdict::Indifferent, Some(&r), None));
        assert_eq!(d, discard(DiscardReason::RecipientOnInternet));
    }

    #[test]
    fn recipient_internet_window_is_strict() {
        let mut r = entry(1, 60);
        r.mark_heard(APRSIS_GROUP, NOW - RECENT_WINDOW);
        let d = decide_gate(&inputs(FilterVerdict::Indifferent, Some(&r), None));
        assert!(d.is_forward());
    }

    #[test]
    fn sender_on_target_rf_discards() {
        let r = entry(1, 60);
        let s = entry(1, 120);
        let d = decide_gate(&inputs(FilterVerdict::Indifferent, Some(&r), Some(&s)));
        assert_eq!(d, discard(DiscardReason::SenderOnRf));
    }

    #[test]
    fn sender_on_other_group_forwards() {
        let r = entry(1, 60);
        let s = entry(2, 120);
        let d = decide_gate(&inputs(FilterVerdict::Indifferent, Some(&r), Some(&s)));
        assert!(d.is_forward());
    }

    #[test]
    fn reject_overrides_passing_checks() {
        let r = entry(1, 60);
        let d = decide_gate(&inputs(FilterVerdict::Reject, Some(&r), None));
        assert_eq!(d, discard(DiscardReason::FilterRejected));
    }

    #[test]
    fn accept_overrides_missing_recipient_history() {
        let d = decide_gate(&inputs(FilterVerdict::Accept, None, None));
        assert_eq!(
            d,
            GateDecision::Forward {
                reason: ForwardReason::FilterAccepted
            }
        );
    }

    #[test]
    fn accept_does_not_override_type_checks() {
        let mut nws = inputs(FilterVerdict::Accept, None, None);
        nws.kind = PacketKind::MESSAGE | PacketKind::NWS;
        assert_eq!(decide_gate(&nws), discard(DiscardReason::WeatherAlert));

        let mut position = inputs(FilterVerdict::Accept, None, None);
        position.kind = PacketKind::POSITION;
        assert_eq!(decide_gate(&position), discard(DiscardReason::NotMessage));

        let mut bulletin = inputs(FilterVerdict::Accept, None, None);
        bulletin.has_recipient = false;
        assert_eq!(decide_gate(&bulletin), discard(DiscardReason::NoRecipient));
    }
}
