//! Error taxonomy shared by every crate in the workspace.
//!
//! Variants map 1:1 onto the kinds in §7; the HTTP boundary
//! (`aip-server`) is the only place that ever looks at [`AipError::status`].

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AipError {
    #[error("request body violates schema: {0}")]
    SchemaInvalid(String),

    #[error("timestamp missing")]
    TimestampMissing,
    #[error("timestamp malformed: {0}")]
    TimestampMalformed(String),
    #[error("timestamp skew {delta_ms}ms exceeds max {max_skew_ms}ms")]
    TimestampSkew { delta_ms: i64, max_skew_ms: i64 },

    #[error("nonce missing")]
    NonceMissing,
    #[error("nonce already seen")]
    NonceReplay,

    #[error("signature missing")]
    SignatureMissing,
    #[error("signature malformed: {0}")]
    SignatureMalformed(String),
    #[error("signature invalid")]
    SignatureInvalid,

    #[error("unknown bidder: {0}")]
    UnknownBidder(String),
    #[error("unknown serve_token: {0}")]
    UnknownServeToken(String),
    #[error("bidder not subscribed to auction")]
    NotSubscribed,
    #[error("auction is no longer active")]
    AuctionNotActive,

    #[error("no parseable price on bid")]
    PricingInvalid,

    #[error("single-charge violation: priority {incoming} <= already recorded {recorded}")]
    SingleChargeViolation { incoming: i8, recorded: i8 },
    #[error("record is NO_BID; events cannot be appended")]
    NoBidNoEvents,
    #[error("invalid ledger transition from {from} via {event}")]
    InvalidTransition { from: String, event: String },

    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("storage backend unavailable: {0}")]
    StorageUnavailable(String),
    #[error("publish failed: {0}")]
    PublishFailed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Status-code family the HTTP boundary should map a given error to.
/// `aip-server` owns the actual `axum` conversion; this keeps the
/// mapping rule itself next to the taxonomy so it can't drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFamily {
    BadRequest,
    Unprocessable,
    ServerError,
}

impl AipError {
    pub fn status_family(&self) -> StatusFamily {
        match self {
            AipError::MissingRequiredField(_) => StatusFamily::BadRequest,
            AipError::StorageUnavailable(_) | AipError::PublishFailed(_) | AipError::Internal(_) => {
                StatusFamily::ServerError
            }
            _ => StatusFamily::Unprocessable,
        }
    }
}
