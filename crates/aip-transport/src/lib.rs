//! Transport guards: canonical JSON, Ed25519 signatures, timestamp skew,
//! and nonce anti-replay (§4.1).

pub mod canonical;
pub mod nonce;
pub mod signature;
pub mod timestamp;

pub use canonical::{to_canonical_bytes, value_to_canonical_bytes};
pub use nonce::NonceCache;
pub use signature::{generate_keypair_pem, sign_payload, verify_signature};
pub use timestamp::{assert_within_skew, parse_timestamp};

/// Composes the bid-response anti-replay key (§4.1):
/// `serve_token:nonce:bidder`, so the same random nonce submitted by two
/// distinct bidders for the same auction does not collide.
pub fn bid_nonce_key(serve_token: &str, nonce: &str, bidder: &str) -> String {
    format!("{serve_token}:{nonce}:{bidder}")
}

/// Composes the event anti-replay key (§4.1):
/// `serve_token:event_type:(event_id|conversion_id|ts)`.
pub fn event_nonce_key(serve_token: &str, event_type: &str, suffix: &str) -> String {
    format!("{serve_token}:{event_type}:{suffix}")
}
