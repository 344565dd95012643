//! Ledger state machine (§4.4), a pure function over a fixed transition
//! table. `NoBidRecorded` is a first-class transition here, unlike
//! `original_source/app/ledger/fsm.py`, which left NO_BID to be written
//! directly by `record_no_bid` rather than routed through the table —
//! the gap the design note in §9 calls out.

use aip_types::{AipError, LedgerEvent, LedgerState};

pub fn transition(current: LedgerState, event: LedgerEvent) -> Result<LedgerState, AipError> {
    use LedgerEvent::*;
    use LedgerState::*;
    match (current, event) {
        (Created, AuctionSettled) => Ok(AuctionCompleted),
        (Created, NoBidRecorded) => Ok(NoBid),
        (AuctionCompleted, EventIngested) => Ok(EventRecorded),
        (EventRecorded, EventIngested) => Ok(EventRecorded),
        (from, event) => Err(AipError::InvalidTransition {
            from: from.to_string(),
            event: event.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_settles_to_auction_completed() {
        assert_eq!(
            transition(LedgerState::Created, LedgerEvent::AuctionSettled).unwrap(),
            LedgerState::AuctionCompleted
        );
    }

    #[test]
    fn created_no_bid_is_explicit() {
        assert_eq!(
            transition(LedgerState::Created, LedgerEvent::NoBidRecorded).unwrap(),
            LedgerState::NoBid
        );
    }

    #[test]
    fn event_recorded_is_idempotent_in_state() {
        assert_eq!(
            transition(LedgerState::EventRecorded, LedgerEvent::EventIngested).unwrap(),
            LedgerState::EventRecorded
        );
    }

    #[test]
    fn no_bid_is_terminal() {
        let err = transition(LedgerState::NoBid, LedgerEvent::EventIngested).unwrap_err();
        assert!(matches!(err, AipError::InvalidTransition { .. }));
    }

    #[test]
    fn event_before_settlement_is_invalid() {
        let err = transition(LedgerState::Created, LedgerEvent::EventIngested).unwrap_err();
        assert!(matches!(err, AipError::InvalidTransition { .. }));
    }
}
