//! The HTTP surface (§6): an `axum::Router` over a single shared
//! [`state::AppState`], grounded in `original_source/app/main.py`'s
//! FastAPI route table.

pub mod backend;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/aip/ping", get(ping))
        .route("/aip/context", post(routes::context::run_auction))
        .route("/aip/bid-response", post(routes::bid_response::submit_bid_response))
        .route("/aip/events", post(routes::events::ingest))
        .route("/v1/weave/recommendations", post(routes::weave::get_or_create))
        .route("/admin/health", get(routes::admin::health))
        .route("/admin/stats", get(routes::admin::stats))
        .route("/admin/config", get(routes::admin::config))
        .route("/admin/bidders", get(routes::admin::bidders))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
