use serde::{Deserialize, Serialize};

/// Preferred billing unit the winner will be charged under (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreferredUnit {
    #[serde(rename = "CPX")]
    Cpx,
    #[serde(rename = "CPC")]
    Cpc,
    #[serde(rename = "CPA")]
    Cpa,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Winner {
    pub brand_agent_id: String,
    pub preferred_unit: PreferredUnit,
    pub reserved_amount_cents: i64,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderPayload {
    pub label: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub cta: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// The wire shape returned from `POST /aip/context` (§6). `ttl_ms` is
/// `max(winner.ttl_ms_or_default, 1000)`, defaulting to 60000.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionResult {
    pub auction_id: String,
    pub serve_token: String,
    pub ttl_ms: u64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub no_bid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderPayload>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

pub const DEFAULT_TTL_MS: u64 = 60_000;
pub const MIN_TTL_MS: u64 = 1_000;

pub fn resolve_ttl_ms(winner_ttl_ms: Option<u64>) -> u64 {
    winner_ttl_ms.unwrap_or(DEFAULT_TTL_MS).max(MIN_TTL_MS)
}
