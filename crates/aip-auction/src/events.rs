//! Billing Event Ingestion (§6, §4.4 single-charge rule), grounded in
//! `original_source/app/events/handler.py::EventService`. Events ride the
//! same signed-envelope contract as bid responses (§6): the signature
//! covers `canonical_bytes(payload)`, verified against the winning
//! bidder's registered public key, since events reconcile billing
//! against the bid that was actually charged.

use aip_ledger::LedgerService;
use aip_registry::BidderRegistry;
use aip_store::RecordStore;
use aip_transport::NonceCache;
use aip_types::{AipError, EventEnvelope, EventType, LedgerRecord};
use serde_json::Value;
use std::str::FromStr;

/// Maps the source's short event-type aliases (`exposure`/`click`/
/// `conversion`, per `EVENT_SCHEMA_MAP`) onto the strict priority-bearing
/// enum, while still accepting the enum's own `snake_case` spelling.
fn resolve_event_type(event_type: &str) -> Result<EventType, AipError> {
    let normalized = match event_type {
        "exposure" => "cpx_exposure",
        "click" => "cpc_click",
        "conversion" => "cpa_conversion",
        other => other,
    };
    EventType::from_str(normalized).map_err(|_| AipError::SchemaInvalid(format!("unknown event type: {event_type}")))
}

fn resolve_winning_bidder_name(winner: &Value) -> Option<&str> {
    ["brand_agent_id", "bidder_name", "bidder", "agent_id"]
        .iter()
        .find_map(|key| winner.get(key).and_then(Value::as_str))
}

pub struct EventContext<'a, S: RecordStore + ?Sized> {
    pub ledger: &'a LedgerService<S>,
    pub registry: &'a BidderRegistry,
    pub nonce_cache: &'a NonceCache,
    pub max_skew_ms: i64,
}

/// `Ingest(envelope)` (§6): resolves the winning bidder from the ledger
/// record, verifies transport guards, then appends under the
/// single-charge rule enforced by `LedgerService::record_event`.
pub async fn ingest<S: RecordStore + ?Sized>(
    envelope: &EventEnvelope,
    ctx: &EventContext<'_, S>,
) -> Result<LedgerRecord, AipError> {
    let record = ctx.ledger.get_record(&envelope.serve_token).await?;
    let winner = record.winner.as_ref().ok_or(AipError::NoBidNoEvents)?;
    let bidder_name = resolve_winning_bidder_name(winner)
        .ok_or_else(|| AipError::MissingRequiredField("brand_agent_id".to_string()))?;
    let bidder = ctx
        .registry
        .get(bidder_name)
        .ok_or_else(|| AipError::UnknownBidder(bidder_name.to_string()))?;

    let nonce_key =
        aip_transport::event_nonce_key(&envelope.serve_token, &envelope.event_type, envelope.replay_key_suffix());
    ctx.nonce_cache.assert_fresh(&nonce_key).await?;
    aip_transport::assert_within_skew(&envelope.timestamp, ctx.max_skew_ms, None)?;
    aip_transport::verify_signature(&envelope.payload, &envelope.signature, &bidder.public_key)?;

    let event_type = resolve_event_type(&envelope.event_type)?;
    ctx.ledger.record_event(&envelope.serve_token, event_type, envelope.payload.clone()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use aip_inbox::BidInbox;
    use aip_store::backends::InMemoryRecordStore;
    use aip_transport::{generate_keypair_pem, sign_payload};
    use aip_types::{BidResponse, BidderConfig, ContextRequest};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::time::Duration;

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
            request_id: Some("req-1".into()),
            serve_token_hint: None,
        }
    }

    async fn settled_record(ledger: &LedgerService<InMemoryRecordStore>, sk: &str, pk: &str) -> LedgerRecord {
        let record = ledger.create_record(context()).await.unwrap();
        let bid_body = json!({"brand_agent_id": "alpha", "price": "2.5000"});
        let _ = sk;
        let alpha = BidResponse { bidder: "alpha".into(), payload: bid_body, price: dec!(2.5000) };
        ledger.settle_auction(&record.serve_token, &[alpha.clone()], Some(&alpha)).await.unwrap();
        let _ = pk;
        ledger.get_record(&record.serve_token).await.unwrap()
    }

    #[tokio::test]
    async fn valid_event_is_recorded_under_single_charge_rule() {
        let ledger = LedgerService::new(Arc::new(InMemoryRecordStore::new()));
        let (sk, pk) = generate_keypair_pem();
        let record = settled_record(&ledger, &sk, &pk).await;

        let bidder = BidderConfig {
            name: "alpha".into(),
            endpoint: "http://alpha".into(),
            public_key: pk,
            timeout_ms: 200,
            pools: BTreeSet::from(["default".to_string()]),
        };
        let registry = BidderRegistry::from_entries(vec![bidder]);
        let nonce_cache = NonceCache::new(Duration::from_secs(60));
        let _inbox = BidInbox::new();

        let payload = json!({"amount_cents": 250});
        let signature = sign_payload(&payload, &sk).unwrap();
        let envelope = EventEnvelope {
            serve_token: record.serve_token.clone(),
            event_type: "exposure".to_string(),
            event_id: Some("evt-1".to_string()),
            conversion_id: None,
            timestamp: Utc::now().to_rfc3339(),
            nonce: "n1".to_string(),
            signature,
            payload,
        };

        let ctx = EventContext { ledger: &ledger, registry: &registry, nonce_cache: &nonce_cache, max_skew_ms: 500 };
        let updated = ingest(&envelope, &ctx).await.unwrap();
        assert_eq!(updated.events.len(), 1);
    }

    #[tokio::test]
    async fn event_on_no_bid_record_is_rejected() {
        let ledger = LedgerService::new(Arc::new(InMemoryRecordStore::new()));
        let record = ledger.create_record(context()).await.unwrap();
        ledger.record_no_bid(&record.serve_token).await.unwrap();

        let registry = BidderRegistry::default();
        let nonce_cache = NonceCache::new(Duration::from_secs(60));
        let envelope = EventEnvelope {
            serve_token: record.serve_token.clone(),
            event_type: "exposure".to_string(),
            event_id: Some("evt-1".to_string()),
            conversion_id: None,
            timestamp: Utc::now().to_rfc3339(),
            nonce: "n1".to_string(),
            signature: "sig".to_string(),
            payload: json!({}),
        };
        let ctx = EventContext { ledger: &ledger, registry: &registry, nonce_cache: &nonce_cache, max_skew_ms: 500 };
        let err = ingest(&envelope, &ctx).await.unwrap_err();
        assert!(matches!(err, AipError::NoBidNoEvents));
    }
}
