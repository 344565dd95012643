//! `POST /aip/bid-response` (§6): a signed bid envelope, appended to the
//! matching auction's inbox if every transport guard passes.

use std::sync::Arc;

use aip_auction::{submit, SubmissionContext};
use aip_types::BidEnvelope;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::error::{parse_body, ApiError};
use crate::state::AppState;

pub async fn submit_bid_response(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let envelope: BidEnvelope = parse_body(body)?;
    let ctx = SubmissionContext {
        registry: &state.registry,
        nonce_cache: &state.nonce_cache,
        inbox: &state.inbox,
        max_skew_ms: state.config.transport.max_clock_skew_ms,
    };
    submit(&envelope, &ctx).await?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "accepted" }))))
}
