//! Recommendation Coordinator (§4.9): cache-first three-path lookup
//! plus a single-flight background auction, grounded in
//! `original_source/app/weave/service.py::WeaveService`.

use std::sync::Arc;

use aip_auction::AuctionRunner;
use aip_distribution::Publisher;
use aip_store::RecordStore;
use aip_store::RecommendationStore;
use aip_types::{AipError, ContextRequest, RecommendationRecord, RecommendationStatus};
use chrono::Utc;

use crate::creative;

pub const RETRY_AFTER_MS: u64 = 150;

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WeaveResponse {
    Completed {
        weave_content: Option<String>,
        serve_token: Option<String>,
        creative_metadata: Option<serde_json::Value>,
    },
    InProgress {
        retry_after_ms: u64,
    },
    Failed {
        error: String,
    },
}

pub struct WeaveCoordinator<RS, S, P>
where
    RS: RecommendationStore + ?Sized,
    S: RecordStore + ?Sized,
    P: Publisher + ?Sized,
{
    store: Arc<RS>,
    runner: Arc<AuctionRunner<S, P>>,
}

impl<RS, S, P> WeaveCoordinator<RS, S, P>
where
    RS: RecommendationStore + ?Sized + 'static,
    S: RecordStore + ?Sized + 'static,
    P: Publisher + ?Sized + 'static,
{
    pub fn new(store: Arc<RS>, runner: Arc<AuctionRunner<S, P>>) -> Self {
        Self { store, runner }
    }

    pub async fn get_or_create(
        &self,
        session_id: &str,
        message_id: &str,
        query: Option<String>,
    ) -> Result<WeaveResponse, AipError> {
        if let Some(existing) = self
            .store
            .get(session_id, message_id)
            .await
            .map_err(|e| AipError::StorageUnavailable(e.to_string()))?
        {
            return Ok(to_response(existing));
        }

        let fresh = RecommendationRecord::new_in_progress(
            session_id.to_string(),
            message_id.to_string(),
            query.clone(),
        );
        let outcome = self
            .store
            .insert_if_absent(fresh)
            .await
            .map_err(|e| AipError::StorageUnavailable(e.to_string()))?;

        if outcome.inserted {
            let store = self.store.clone();
            let runner = self.runner.clone();
            let session_id = session_id.to_string();
            let message_id = message_id.to_string();
            tokio::spawn(async move {
                run_and_update(store, runner, session_id, message_id, query).await;
            });
        }

        Ok(to_response(outcome.record))
    }
}

fn to_response(record: RecommendationRecord) -> WeaveResponse {
    match record.status {
        RecommendationStatus::Completed => WeaveResponse::Completed {
            weave_content: record.weave_content,
            serve_token: record.serve_token,
            creative_metadata: record.creative_metadata,
        },
        RecommendationStatus::InProgress => WeaveResponse::InProgress { retry_after_ms: RETRY_AFTER_MS },
        RecommendationStatus::Failed => {
            WeaveResponse::Failed { error: record.error.unwrap_or_else(|| "auction failed".to_string()) }
        }
    }
}

/// Builds a minimal `ContextRequest` for session/message context, per
/// `_build_context_request`: no conversation history is available here,
/// so only the fields the auction pipeline strictly needs are set.
fn build_context_request(session_id: &str, message_id: &str, query: Option<String>) -> ContextRequest {
    ContextRequest {
        context_id: format!("ctx_{message_id}"),
        session_id: session_id.to_string(),
        platform_id: None,
        operator_id: None,
        query_text: query,
        locale: None,
        geo: None,
        timestamp: Utc::now().to_rfc3339(),
        intent: None,
        allowed_formats: vec!["weave".to_string()],
        auth: None,
        verticals: None,
        extensions: None,
        category_pools: None,
        categories: None,
        pools: None,
        context: None,
        features: None,
        request_id: None,
        serve_token_hint: None,
    }
}

/// Runs detached from the triggering request's lifecycle: owned by the
/// `tokio::spawn`ed task, which the process — not the HTTP caller — keeps
/// alive (§9 "Background tasks").
async fn run_and_update<RS, S, P>(
    store: Arc<RS>,
    runner: Arc<AuctionRunner<S, P>>,
    session_id: String,
    message_id: String,
    query: Option<String>,
) where
    RS: RecommendationStore + ?Sized,
    S: RecordStore + ?Sized,
    P: Publisher + ?Sized,
{
    let context = build_context_request(&session_id, &message_id, query.clone());
    let outcome = runner.run(context).await;

    let mut updated = match store.get(&session_id, &message_id).await {
        Ok(Some(existing)) => existing,
        _ => RecommendationRecord::new_in_progress(session_id.clone(), message_id.clone(), query),
    };
    match outcome {
        Ok(record) => {
            let (weave_content, metadata) = creative::generate(&record);
            updated.status = RecommendationStatus::Completed;
            updated.weave_content = Some(weave_content);
            updated.serve_token = Some(record.serve_token.clone());
            updated.creative_metadata =
                metadata.map(|m| serde_json::to_value(m).unwrap_or(serde_json::Value::Null));
            updated.auction_result = serde_json::to_value(&record).ok();
        }
        Err(err) => {
            tracing::error!(session_id = %session_id, message_id = %message_id, error = %err, "background auction failed");
            updated.status = RecommendationStatus::Failed;
            updated.error = Some(err.to_string());
        }
    }
    updated.updated_at = Utc::now();

    if let Err(e) = store.put(updated).await {
        tracing::error!(session_id = %session_id, message_id = %message_id, error = %e, "failed to persist recommendation update");
    }
}
