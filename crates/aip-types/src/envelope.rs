use serde::{Deserialize, Serialize};

/// A signed bid envelope as received on `POST /aip/bid-response` (§4.6, §6).
/// The `bid` sub-object is kept as a raw [`serde_json::Value`] since its
/// shape (pricing keys, auth block) is bidder-defined; `aip-auction`
/// extracts the stable fields it needs out of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidEnvelope {
    #[serde(default)]
    pub serve_token: Option<String>,
    /// Legacy fallback key accepted in place of `serve_token` (§4.6 step 1).
    #[serde(default)]
    pub auction_id: Option<String>,
    pub bid: serde_json::Value,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
}

impl BidEnvelope {
    /// `serve_token`, falling back to the legacy `auction_id` key.
    pub fn token(&self) -> Option<&str> {
        self.serve_token.as_deref().or(self.auction_id.as_deref())
    }
}

/// A signed event envelope as received on `POST /aip/events` (§4 non-goals
/// section treats ingestion generically; shape mirrors `BidEnvelope`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub serve_token: String,
    pub event_type: String,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub conversion_id: Option<String>,
    pub timestamp: String,
    pub nonce: String,
    pub signature: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// The replay-key suffix used to compose `serve_token:event_type:suffix`
    /// (§4.1): prefers `event_id`, then `conversion_id`, then the timestamp.
    pub fn replay_key_suffix(&self) -> &str {
        self.event_id
            .as_deref()
            .or(self.conversion_id.as_deref())
            .unwrap_or(&self.timestamp)
    }
}
