//! Distribution Publisher (§4.3): one publish per distinct pool, not per
//! bidder. Grounded in `original_source/app/auction/fanout.py`.

use std::collections::BTreeSet;

use aip_types::AipError;
use async_trait::async_trait;
use serde::Serialize;

/// `Publish(auction_id, pool, payload)` (§4.3).
#[async_trait]
#[auto_impl::auto_impl(Arc)]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        auction_id: &str,
        pool: &str,
        payload: &serde_json::Value,
    ) -> Result<(), AipError>;
}

/// No network; logs delivery. Used for tests and single-process
/// deployment.
#[derive(Debug, Default)]
pub struct LocalPublisher;

#[async_trait]
impl Publisher for LocalPublisher {
    async fn publish(
        &self,
        auction_id: &str,
        pool: &str,
        _payload: &serde_json::Value,
    ) -> Result<(), AipError> {
        tracing::info!(auction_id, pool, "local-pubsub delivered");
        Ok(())
    }
}

/// One topic per pool over a generic HTTP publish endpoint. No
/// `google-cloud-pubsub` crate exists in the reachable dependency set;
/// this posts canonical JSON to `{base_url}/{topic}` with `pool` and
/// `auction_id` headers, functionally equivalent to pub/sub message
/// attributes.
pub struct ManagedTopicPublisher {
    client: reqwest::Client,
    base_url: String,
    topic_prefix: String,
}

impl ManagedTopicPublisher {
    pub fn new(base_url: impl Into<String>, topic_prefix: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            topic_prefix: topic_prefix.into(),
        }
    }

    /// `<prefix>-<pool>`, or `prefix` verbatim when it already ends in
    /// `/<pool>` (§4.3).
    pub fn topic_name(prefix: &str, pool: &str) -> String {
        let suffix = format!("/{pool}");
        if prefix.ends_with(&suffix) {
            prefix.to_string()
        } else {
            format!("{prefix}-{pool}")
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    auction_id: &'a str,
    pool: &'a str,
    context: &'a serde_json::Value,
}

#[async_trait]
impl Publisher for ManagedTopicPublisher {
    async fn publish(
        &self,
        auction_id: &str,
        pool: &str,
        payload: &serde_json::Value,
    ) -> Result<(), AipError> {
        let topic = Self::topic_name(&self.topic_prefix, pool);
        let body = aip_transport::value_to_canonical_bytes(
            &serde_json::to_value(Envelope { auction_id, pool, context: payload })
                .map_err(|e| AipError::Internal(e.to_string()))?,
        );
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), topic);
        self.client
            .post(url)
            .header("X-Aip-Pool", pool)
            .header("X-Aip-Auction-Id", auction_id)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| AipError::PublishFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| AipError::PublishFailed(e.to_string()))?;
        Ok(())
    }
}

/// Result of fanning out to every distinct pool: which pools published
/// successfully, and which failed with what error, so the runner can
/// abandon only the failed pools (§4.3).
pub struct FanoutOutcome {
    pub published: Vec<String>,
    pub failed: Vec<(String, AipError)>,
}

/// Publishes once per **distinct** pool (§4.3), isolating per-pool
/// failures per the Open Question resolution in §9.
pub async fn fanout(
    publisher: &dyn Publisher,
    auction_id: &str,
    pools: &[String],
    payload: &serde_json::Value,
) -> FanoutOutcome {
    let distinct: BTreeSet<&str> = pools.iter().map(String::as_str).collect();
    let results = futures::future::join_all(distinct.into_iter().map(|pool| async move {
        let outcome = publisher.publish(auction_id, pool, payload).await;
        (pool.to_string(), outcome)
    }))
    .await;

    let mut published = Vec::new();
    let mut failed = Vec::new();
    for (pool, outcome) in results {
        match outcome {
            Ok(()) => published.push(pool),
            Err(e) => failed.push((pool, e)),
        }
    }
    FanoutOutcome { published, failed }
}
