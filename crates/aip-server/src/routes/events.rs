//! `POST /aip/events` (§6): a signed billing event envelope, appended
//! under the single-charge rule once transport guards pass.

use std::sync::Arc;

use aip_auction::{ingest_event, EventContext};
use aip_types::EventEnvelope;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::error::{parse_body, ApiError};
use crate::state::AppState;

pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let envelope: EventEnvelope = parse_body(body)?;
    let ctx = EventContext {
        ledger: &state.ledger,
        registry: &state.registry,
        nonce_cache: &state.nonce_cache,
        max_skew_ms: state.config.transport.max_clock_skew_ms,
    };
    let event_type = envelope.event_type.clone();
    let serve_token = envelope.serve_token.clone();
    ingest_event(&envelope, &ctx).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "status": "accepted", "serve_token": serve_token, "event_type": event_type })),
    ))
}
