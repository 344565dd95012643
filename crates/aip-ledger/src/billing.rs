//! Clearing price computation (§4.4), grounded in
//! `original_source/app/ledger/billing.py`. Represented with
//! `rust_decimal` rather than the original's `float` so the wire string
//! is exact rather than binary-float-rounded.

use aip_types::LedgerRecord;
use rust_decimal::Decimal;

/// Second-price (Vickrey) clearing: the winner pays the second-highest
/// bid, or their own bid if they were the only one. No winner clears at
/// zero.
pub fn clearing_price(bids: &[LedgerBid], winner: Option<&LedgerBid>) -> Decimal {
    let Some(winner) = winner else {
        return Decimal::ZERO;
    };
    let mut sorted: Vec<&LedgerBid> = bids.iter().collect();
    sorted.sort_by(|a, b| b.price.cmp(&a.price));
    if sorted.len() < 2 {
        return winner.price;
    }
    sorted[1].price
}

/// Renders a clearing price as the fixed 4-decimal wire string (§4.4, §6).
pub fn clearing_price_wire(price: Decimal) -> String {
    format!("{:.4}", price)
}

/// A minimal view over a received bid, independent of the envelope it
/// arrived in; `aip-auction` maps its richer `BidResponse` down to this
/// before calling into billing.
#[derive(Debug, Clone)]
pub struct LedgerBid {
    pub bidder: String,
    pub price: Decimal,
}

impl From<&aip_types::BidResponse> for LedgerBid {
    fn from(bid: &aip_types::BidResponse) -> Self {
        Self { bidder: bid.bidder.clone(), price: bid.price }
    }
}

pub fn max_recorded_priority(record: &LedgerRecord) -> i8 {
    record.max_recorded_priority()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bid(bidder: &str, price: Decimal) -> LedgerBid {
        LedgerBid { bidder: bidder.to_string(), price }
    }

    #[test]
    fn no_winner_clears_at_zero() {
        assert_eq!(clearing_price(&[], None), Decimal::ZERO);
    }

    #[test]
    fn single_bid_clears_at_its_own_price() {
        let winner = bid("alpha", dec!(2.5000));
        assert_eq!(clearing_price(&[winner.clone()], Some(&winner)), dec!(2.5000));
    }

    #[test]
    fn two_bids_clear_at_second_highest() {
        let winner = bid("alpha", dec!(3.0000));
        let loser = bid("beta", dec!(1.2500));
        let bids = vec![winner.clone(), loser.clone()];
        assert_eq!(clearing_price(&bids, Some(&winner)), dec!(1.2500));
    }

    #[test]
    fn wire_format_is_four_decimals() {
        assert_eq!(clearing_price_wire(dec!(1.25)), "1.2500");
    }
}
