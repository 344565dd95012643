//! Bid Response Submission pipeline (§4.6).

use std::str::FromStr;

use aip_inbox::BidInbox;
use aip_registry::BidderRegistry;
use aip_transport::NonceCache;
use aip_types::{AipError, BidEnvelope, BidResponse};
use rust_decimal::Decimal;
use serde_json::Value;

fn first_str<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| obj.get(key).and_then(Value::as_str))
}

fn resolve_bidder_name(bid: &Value) -> Result<&str, AipError> {
    first_str(bid, &["brand_agent_id", "bidder_name", "bidder", "agent_id"])
        .ok_or_else(|| AipError::MissingRequiredField("brand_agent_id".to_string()))
}

fn resolve_timestamp<'a>(envelope: &'a BidEnvelope, bid: &'a Value) -> Option<&'a str> {
    envelope
        .timestamp
        .as_deref()
        .or_else(|| bid.pointer("/auth/timestamp").and_then(Value::as_str))
        .or_else(|| bid.get("timestamp").and_then(Value::as_str))
}

fn resolve_nonce<'a>(envelope: &'a BidEnvelope, bid: &'a Value) -> Option<&'a str> {
    envelope
        .nonce
        .as_deref()
        .or_else(|| bid.pointer("/auth/nonce").and_then(Value::as_str))
        .or_else(|| bid.get("nonce").and_then(Value::as_str))
}

fn resolve_signature<'a>(envelope: &'a BidEnvelope, bid: &'a Value) -> Option<&'a str> {
    envelope.signature.as_deref().or_else(|| bid.get("signature").and_then(Value::as_str))
}

/// First defined value among `bid.pricing.{cpa,cpc,cpx}` (case-insensitive
/// key match), else `bid.price`.
fn resolve_price(bid: &Value) -> Result<Decimal, AipError> {
    if let Some(pricing) = bid.get("pricing").and_then(Value::as_object) {
        for key in ["cpa", "cpc", "cpx"] {
            if let Some(value) = pricing.iter().find_map(|(k, v)| (k.eq_ignore_ascii_case(key)).then_some(v)) {
                if let Some(price) = value_to_decimal(value) {
                    return Ok(price);
                }
            }
        }
    }
    if let Some(value) = bid.get("price") {
        if let Some(price) = value_to_decimal(value) {
            return Ok(price);
        }
    }
    Err(AipError::PricingInvalid)
}

fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
}

pub struct SubmissionContext<'a> {
    pub registry: &'a BidderRegistry,
    pub nonce_cache: &'a NonceCache,
    pub inbox: &'a BidInbox,
    pub max_skew_ms: i64,
}

/// `Submit(envelope)` (§4.6): validates, then appends to the inbox for
/// the named `serve_token`.
pub async fn submit(envelope: &BidEnvelope, ctx: &SubmissionContext<'_>) -> Result<(), AipError> {
    let serve_token = envelope
        .token()
        .ok_or_else(|| AipError::MissingRequiredField("serve_token".to_string()))?;

    let bid = envelope
        .bid
        .as_object()
        .ok_or_else(|| AipError::MissingRequiredField("bid".to_string()))?;
    let bid_value = Value::Object(bid.clone());

    let bidder_name = resolve_bidder_name(&bid_value)?;
    let bidder = ctx
        .registry
        .get(bidder_name)
        .ok_or_else(|| AipError::UnknownBidder(bidder_name.to_string()))?;

    let timestamp = resolve_timestamp(envelope, &bid_value).ok_or(AipError::TimestampMissing)?;
    let nonce = resolve_nonce(envelope, &bid_value).ok_or(AipError::NonceMissing)?;

    let nonce_key = aip_transport::bid_nonce_key(serve_token, nonce, bidder_name);
    ctx.nonce_cache.assert_fresh(&nonce_key).await?;

    aip_transport::assert_within_skew(timestamp, ctx.max_skew_ms, None)?;

    let signature = resolve_signature(envelope, &bid_value).ok_or(AipError::SignatureMissing)?;
    aip_transport::verify_signature(&bid_value, signature, &bidder.public_key)?;

    let price = resolve_price(&bid_value)?;

    ctx.inbox
        .add(serve_token, BidResponse { bidder: bidder.name.clone(), payload: bid_value, price })
        .await
}
