//! `POST /aip/context` (§6): runs one auction end to end and returns
//! the `AuctionResult` wire shape.

use std::sync::Arc;

use aip_types::{resolve_ttl_ms, AuctionResult, ContextRequest, LedgerRecord, Winner};
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::error::{parse_body, ApiError};
use crate::state::AppState;

pub async fn run_auction(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<AuctionResult>, ApiError> {
    state.validator.validate("context_request", &body)?;
    let context: ContextRequest = parse_body(body)?;
    let record = state.runner.run(context).await?;
    Ok(Json(to_auction_result(&record)))
}

/// Maps the internal `LedgerRecord` onto the external §6 shape: `winner`
/// is reconstructed from the raw winning bid payload when present,
/// `ttl_ms` resolved via `resolve_ttl_ms` (floor 1000ms, default 60000ms).
fn to_auction_result(record: &LedgerRecord) -> AuctionResult {
    let winner = record.winner.as_ref().and_then(value_to_winner);
    let ttl_ms = resolve_ttl_ms(record.winner.as_ref().and_then(|w| w.get("ttl_ms")).and_then(Value::as_u64));
    AuctionResult {
        auction_id: record.auction_id.clone(),
        serve_token: record.serve_token.clone(),
        ttl_ms,
        no_bid: record.no_bid,
        winner,
        render: None,
    }
}

fn value_to_winner(payload: &Value) -> Option<Winner> {
    serde_json::from_value(payload.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aip_types::{LedgerState, PreferredUnit};

    fn context() -> ContextRequest {
        ContextRequest {
            context_id: "ctx-1".into(),
            session_id: "sess-1".into(),
            platform_id: None,
            operator_id: None,
            query_text: None,
            locale: None,
            geo: None,
            timestamp: "2026-07-31T00:00:00Z".into(),
            intent: None,
            allowed_formats: vec![],
            auth: None,
            verticals: None,
            extensions: None,
            category_pools: None,
            categories: None,
            pools: None,
            context: None,
            features: None,
            request_id: None,
            serve_token_hint: None,
        }
    }

    fn record_with_winner(winner: Value) -> LedgerRecord {
        LedgerRecord {
            serve_token: "tok-1".into(),
            auction_id: "auction-1".into(),
            state: LedgerState::AuctionCompleted,
            context: context(),
            pools: vec![],
            eligible_bidders: vec![],
            bids: vec![],
            winner: Some(winner),
            clearing_price: Some("1.5000".into()),
            no_bid: false,
            events: vec![],
            published_pools: vec![],
        }
    }

    #[test]
    fn no_bid_result_has_default_ttl_and_no_winner() {
        let mut record = record_with_winner(serde_json::json!({}));
        record.winner = None;
        record.no_bid = true;
        let result = to_auction_result(&record);
        assert!(result.no_bid);
        assert!(result.winner.is_none());
        assert_eq!(result.ttl_ms, 60_000);
    }

    #[test]
    fn winner_payload_maps_to_wire_shape() {
        let record = record_with_winner(serde_json::json!({
            "brand_agent_id": "alpha",
            "preferred_unit": "CPC",
            "reserved_amount_cents": 150,
        }));
        let result = to_auction_result(&record);
        let winner = result.winner.unwrap();
        assert_eq!(winner.brand_agent_id, "alpha");
        assert_eq!(winner.preferred_unit, PreferredUnit::Cpc);
        assert_eq!(winner.reserved_amount_cents, 150);
    }
}
