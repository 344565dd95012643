//! End-to-end HTTP-surface scenarios (§8), driven through the real
//! `axum::Router` via `tower::ServiceExt::oneshot` against an in-memory
//! backend.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use aip_server::config::ServerConfig;
use aip_server::{build_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn call(router: &axum::Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

/// Escapes a PEM block into a double-quoted YAML scalar so the registry
/// inventory can embed it on one logical line.
fn yaml_escape_pem(pem: &str) -> String {
    pem.replace('\n', "\\n")
}

fn bidders_yaml(entries: &[(&str, &str, &[&str])]) -> tempfile::NamedTempFile {
    let mut body = String::from("bidders:\n");
    for (name, public_key, pools) in entries {
        body.push_str(&format!(
            "  - name: \"{name}\"\n    endpoint: \"http://{name}.example\"\n    public_key: \"{}\"\n    pools: [{}]\n",
            yaml_escape_pem(public_key),
            pools.iter().map(|p| format!("\"{p}\"")).collect::<Vec<_>>().join(", "),
        ));
    }
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

async fn build_state(bidders: tempfile::NamedTempFile, window_ms: u64) -> (Arc<AppState>, tempfile::NamedTempFile) {
    let mut config = ServerConfig::default();
    config.bidders_path = bidders.path().to_string_lossy().to_string();
    config.auction.window_ms = window_ms;
    let state = Arc::new(AppState::build(config).await.unwrap());
    (state, bidders)
}

fn context_body() -> Value {
    json!({
        "context_id": "ctx-1",
        "session_id": "sess-1",
        "timestamp": Utc::now().to_rfc3339(),
        "allowed_formats": ["weave"],
        "pools": ["default"],
    })
}

/// Polls `state.ledger.list_records()` until the in-flight auction has
/// been created, yielding to the cooperative scheduler each time —
/// reliable under a single-threaded test runtime since every in-memory
/// store call resolves on its first poll.
async fn wait_for_record(state: &AppState) -> aip_types::LedgerRecord {
    for _ in 0..50 {
        tokio::task::yield_now().await;
        let records = state.ledger.list_records().await.unwrap();
        if let Some(record) = records.into_iter().next() {
            return record;
        }
    }
    panic!("auction record was never created");
}

fn signed_bid(serve_token: &str, bidder: &str, price: &str, private_key_pem: &str) -> Value {
    let bid = json!({
        "brand_agent_id": bidder,
        "price": price,
        "preferred_unit": "CPC",
        "reserved_amount_cents": 150,
    });
    let signature = testing_tools::sign(&bid, private_key_pem);
    json!({
        "serve_token": serve_token,
        "bid": bid,
        "timestamp": Utc::now().to_rfc3339(),
        "nonce": uuid::Uuid::new_v4().to_string(),
        "signature": signature,
    })
}

#[tokio::test(start_paused = true)]
async fn happy_path_auction_settles_on_the_highest_bid() {
    let keypair = testing_tools::Keypair::generate();
    let bidders = bidders_yaml(&[("alpha", &keypair.public_key_pem, &["default"])]);
    let (state, _bidders) = build_state(bidders, 50).await;
    let router = build_router(state.clone());

    let context_task = {
        let router = router.clone();
        tokio::spawn(async move { call(&router, "POST", "/aip/context", context_body()).await })
    };

    let record = wait_for_record(&state).await;
    let (bid_status, _) =
        call(&router, "POST", "/aip/bid-response", signed_bid(&record.serve_token, "alpha", "2.5000", &keypair.private_key_pem))
            .await;
    assert_eq!(bid_status, StatusCode::ACCEPTED);

    let (status, body) = context_task.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("no_bid").is_none(), "no_bid is omitted from the wire shape when false");
    assert_eq!(body["winner"]["brand_agent_id"], json!("alpha"));
}

#[tokio::test(start_paused = true)]
async fn auction_with_no_bidders_reports_no_bid() {
    let bidders = bidders_yaml(&[]);
    let (state, _bidders) = build_state(bidders, 20).await;
    let router = build_router(state.clone());

    let (status, body) = call(&router, "POST", "/aip/context", context_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["no_bid"], json!(true));
    assert!(body.get("winner").is_none() || body["winner"].is_null());
    assert_eq!(body["ttl_ms"], json!(60_000));
}

#[tokio::test(start_paused = true)]
async fn replayed_bid_nonce_is_rejected() {
    let keypair = testing_tools::Keypair::generate();
    let bidders = bidders_yaml(&[("alpha", &keypair.public_key_pem, &["default"])]);
    let (state, _bidders) = build_state(bidders, 50).await;
    let router = build_router(state.clone());

    let context_task = {
        let router = router.clone();
        tokio::spawn(async move { call(&router, "POST", "/aip/context", context_body()).await })
    };
    let record = wait_for_record(&state).await;
    let envelope = signed_bid(&record.serve_token, "alpha", "2.5000", &keypair.private_key_pem);

    let (first, _) = call(&router, "POST", "/aip/bid-response", envelope.clone()).await;
    assert_eq!(first, StatusCode::ACCEPTED);
    let (second, body) = call(&router, "POST", "/aip/bid-response", envelope).await;
    assert_eq!(second, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("nonce"));

    context_task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn bidder_outside_the_auctions_pool_is_rejected() {
    let keypair = testing_tools::Keypair::generate();
    let bidders = bidders_yaml(&[("alpha", &keypair.public_key_pem, &["electronics"])]);
    let (state, _bidders) = build_state(bidders, 30).await;
    let router = build_router(state.clone());

    let context_task = {
        let router = router.clone();
        tokio::spawn(async move { call(&router, "POST", "/aip/context", context_body()).await })
    };
    let record = wait_for_record(&state).await;
    assert!(!record.eligible_bidders.iter().any(|b| b == "alpha"));

    let (status, body) =
        call(&router, "POST", "/aip/bid-response", signed_bid(&record.serve_token, "alpha", "2.5000", &keypair.private_key_pem))
            .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("not subscribed"));

    let (_, context_body) = context_task.await.unwrap();
    assert_eq!(context_body["no_bid"], json!(true));
}

#[tokio::test(start_paused = true)]
async fn event_priority_must_strictly_increase() {
    let keypair = testing_tools::Keypair::generate();
    let bidders = bidders_yaml(&[("alpha", &keypair.public_key_pem, &["default"])]);
    let (state, _bidders) = build_state(bidders, 20).await;
    let router = build_router(state.clone());

    let context_task = {
        let router = router.clone();
        tokio::spawn(async move { call(&router, "POST", "/aip/context", context_body()).await })
    };
    let record = wait_for_record(&state).await;
    call(&router, "POST", "/aip/bid-response", signed_bid(&record.serve_token, "alpha", "2.5000", &keypair.private_key_pem))
        .await;
    let (_, result) = context_task.await.unwrap();
    assert_eq!(result["winner"]["brand_agent_id"], json!("alpha"));

    let post_event = |event_type: &'static str| {
        let router = router.clone();
        let serve_token = record.serve_token.clone();
        let private_key_pem = keypair.private_key_pem.clone();
        async move {
            let payload = json!({ "event_type": event_type });
            let signature = testing_tools::sign(&payload, &private_key_pem);
            let envelope = json!({
                "serve_token": serve_token,
                "event_type": event_type,
                "event_id": format!("{event_type}-1"),
                "timestamp": Utc::now().to_rfc3339(),
                "nonce": uuid::Uuid::new_v4().to_string(),
                "signature": signature,
                "payload": payload,
            });
            call(&router, "POST", "/aip/events", envelope).await
        }
    };

    let (conversion_status, _) = post_event("cpa_conversion").await;
    assert_eq!(conversion_status, StatusCode::ACCEPTED);

    let (click_status, click_body) = post_event("cpc_click").await;
    assert_eq!(click_status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(click_body["detail"].as_str().unwrap().contains("single-charge"));
}

#[tokio::test(start_paused = true)]
async fn recommendation_lookup_is_in_progress_then_completes_once() {
    let bidders = bidders_yaml(&[]);
    let (state, _bidders) = build_state(bidders, 10).await;
    let router = build_router(state.clone());

    let request = json!({ "session_id": "s1", "message_id": "m1" });
    let (status, body) = call(&router, "POST", "/v1/weave/recommendations", request.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("in_progress"));

    tokio::time::advance(Duration::from_millis(200)).await;
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }

    let (status, body) = call(&router, "POST", "/v1/weave/recommendations", request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("completed"));
}
