//! Stable data spine for the ad-auction coordinator: the typed structs
//! every other crate in the workspace shares, plus the error taxonomy
//! the HTTP boundary maps onto status codes.

pub mod auction_result;
pub mod bidder;
pub mod context;
pub mod envelope;
pub mod error;
pub mod ledger;
pub mod recommendation;

pub use auction_result::{AuctionResult, PreferredUnit, RenderPayload, Winner};
pub use bidder::BidderConfig;
pub use context::ContextRequest;
pub use envelope::{BidEnvelope, EventEnvelope};
pub use error::AipError;
pub use ledger::{BidResponse, EventRecord, EventType, LedgerEvent, LedgerRecord, LedgerState};
pub use recommendation::{RecommendationRecord, RecommendationStatus};
