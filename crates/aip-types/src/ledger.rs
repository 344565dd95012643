use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::context::ContextRequest;

/// Ledger FSM states (§4.4). `NoBid` is reached explicitly via
/// `NoBidRecorded` rather than inferred from an empty bid list, per the
/// "FSM gap in source" design note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerState {
    Created,
    AuctionCompleted,
    NoBid,
    EventRecorded,
}

/// FSM events driving transitions (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LedgerEvent {
    AuctionSettled,
    NoBidRecorded,
    EventIngested,
}

/// Billing event kinds and their single-charge priority (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    CpxExposure,
    CpcClick,
    CpaConversion,
}

impl EventType {
    pub fn priority(self) -> i8 {
        match self {
            EventType::CpxExposure => 0,
            EventType::CpcClick => 1,
            EventType::CpaConversion => 2,
        }
    }
}

/// A single appended billing event, strictly increasing in priority
/// order across a record's lifetime (single-charge rule, §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_type: EventType,
    pub priority: i8,
    pub payload: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

/// A bid accepted into the inbox for one in-flight auction (§3, §4.5/4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidResponse {
    pub bidder: String,
    pub payload: serde_json::Value,
    pub price: Decimal,
}

/// The durable auction/billing record keyed by `serve_token` (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub serve_token: String,
    pub auction_id: String,
    pub state: LedgerState,
    pub context: ContextRequest,
    #[serde(default)]
    pub pools: Vec<String>,
    #[serde(default)]
    pub eligible_bidders: Vec<String>,
    #[serde(default)]
    pub bids: Vec<serde_json::Value>,
    #[serde(default)]
    pub winner: Option<serde_json::Value>,
    #[serde(default)]
    pub clearing_price: Option<String>,
    #[serde(default)]
    pub no_bid: bool,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    /// Pools the distribution publisher successfully reached, tracked for
    /// audit per the Open Question resolution in §9.
    #[serde(default)]
    pub published_pools: Vec<String>,
}

impl LedgerRecord {
    pub fn max_recorded_priority(&self) -> i8 {
        self.events.iter().map(|e| e.priority).max().unwrap_or(-1)
    }
}
