//! `/admin/*` debug endpoints, grounded in
//! `original_source/app/admin/{bidders,config,health,stats}.py`.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let records = state.ledger.list_records().await?;
    Ok(Json(json!({ "records": records.len() })))
}

pub async fn config(State(state): State<Arc<AppState>>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "listen": { "host": config.listen.host, "port": config.listen.port },
        "transport": {
            "nonce_ttl_seconds": config.transport.nonce_ttl_seconds,
            "max_clock_skew_ms": config.transport.max_clock_skew_ms,
        },
        "ledger": {
            "backend": config.ledger.backend,
            "options": config.ledger.options,
        },
        "auction": {
            "window_ms": config.auction.window_ms,
            "distribution": { "backend": config.auction.distribution.backend },
        },
    }))
}

pub async fn bidders(State(state): State<Arc<AppState>>) -> Json<Value> {
    let inventory: Vec<Value> = state
        .registry
        .all()
        .map(|bidder| {
            json!({
                "id": bidder.name,
                "endpoint": bidder.endpoint,
                "pools": bidder.pools.iter().collect::<Vec<_>>(),
                "permissions": ["submit-bid"],
                "status": "active",
            })
        })
        .collect();
    Json(Value::Array(inventory))
}
