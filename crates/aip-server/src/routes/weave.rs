//! `POST /v1/weave/recommendations` (§6): the cache-first single-flight
//! recommendation lookup.

use std::sync::Arc;

use aip_weave::WeaveResponse;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub session_id: String,
    pub message_id: String,
    #[serde(default)]
    pub query: Option<String>,
}

pub async fn get_or_create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RecommendationRequest>,
) -> Result<Json<WeaveResponse>, ApiError> {
    let response = state.weave.get_or_create(&body.session_id, &body.message_id, body.query).await?;
    Ok(Json(response))
}
