//! Winner selection (§4.7): argmax by price, ties broken by inbox
//! acceptance order (already FIFO, so a stable scan suffices).

use aip_types::BidResponse;

pub fn select_winner(bids: &[BidResponse]) -> Option<&BidResponse> {
    bids.iter().fold(None, |best, bid| match best {
        Some(current) if current.price >= bid.price => Some(current),
        _ => Some(bid),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn bid(bidder: &str, price: rust_decimal::Decimal) -> BidResponse {
        BidResponse { bidder: bidder.to_string(), payload: json!({}), price }
    }

    #[test]
    fn empty_bids_have_no_winner() {
        assert!(select_winner(&[]).is_none());
    }

    #[test]
    fn highest_price_wins() {
        let bids = vec![bid("a", dec!(1.0)), bid("b", dec!(3.0)), bid("c", dec!(2.0))];
        assert_eq!(select_winner(&bids).unwrap().bidder, "b");
    }

    #[test]
    fn ties_break_to_first_accepted() {
        let bids = vec![bid("first", dec!(2.0)), bid("second", dec!(2.0))];
        assert_eq!(select_winner(&bids).unwrap().bidder, "first");
    }
}
