use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weave recommendation lifecycle state (§3, §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    InProgress,
    Completed,
    Failed,
}

/// Keyed by `(session_id, message_id)`; created once per key and
/// transitioned exactly once by the background auction worker (§3, §4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub session_id: String,
    pub message_id: String,
    pub status: RecommendationStatus,
    #[serde(default)]
    pub query: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub weave_content: Option<String>,
    #[serde(default)]
    pub serve_token: Option<String>,
    #[serde(default)]
    pub creative_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub auction_result: Option<serde_json::Value>,

    #[serde(default)]
    pub error: Option<String>,
}

impl RecommendationRecord {
    pub fn new_in_progress(session_id: String, message_id: String, query: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            message_id,
            status: RecommendationStatus::InProgress,
            query,
            created_at: now,
            updated_at: now,
            weave_content: None,
            serve_token: None,
            creative_metadata: None,
            auction_result: None,
            error: None,
        }
    }
}
