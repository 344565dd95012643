use serde::{Deserialize, Serialize};

/// The platform's contextual auction request, already mapped from the
/// raw `PlatformRequest` body (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextRequest {
    pub context_id: String,
    pub session_id: String,
    #[serde(default)]
    pub platform_id: Option<String>,
    #[serde(default)]
    pub operator_id: Option<String>,
    #[serde(default)]
    pub query_text: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub geo: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub intent: Option<Intent>,
    #[serde(default)]
    pub allowed_formats: Vec<String>,
    #[serde(default)]
    pub auth: Option<serde_json::Value>,
    #[serde(default)]
    pub verticals: Option<Vec<String>>,
    /// Vendor extensions keyed by `^[a-z0-9][a-z0-9_-]{1,63}$`; kept as a raw
    /// blob so canonical JSON and signing run over it unchanged.
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,

    /// Pool classification hints the runner reads during `Classify` (§4.8).
    /// These are top-level or `context`-nested keys in the source payload;
    /// we keep them on the struct rather than discard them during mapping.
    #[serde(default)]
    pub category_pools: Option<serde_json::Value>,
    #[serde(default)]
    pub categories: Option<serde_json::Value>,
    #[serde(default)]
    pub pools: Option<serde_json::Value>,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
    #[serde(default)]
    pub features: Option<serde_json::Value>,

    /// Upstream idempotency hints consumed by `Ledger.Create` (§4.4).
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub serve_token_hint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub decision_phase: Option<String>,
    pub context_summary: Option<String>,
    pub turn_index: Option<u32>,
}

const VENDOR_ID_PATTERN_HINT: &str = "^[a-z0-9][a-z0-9_-]{1,63}$";

/// Validates a vendor extension key against the pattern named in §3/§6.
/// Schema enforcement of the full body lives in `aip-validation`; this is
/// a cheap standalone check usable anywhere a single key needs validating.
pub fn is_valid_vendor_key(key: &str) -> bool {
    if key.len() < 2 || key.len() > 64 {
        return false;
    }
    let mut chars = key.chars();
    let Some(first) = chars.next() else { return false };
    let first_ok = first.is_ascii_lowercase() || first.is_ascii_digit();
    let rest_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    let _ = VENDOR_ID_PATTERN_HINT;
    first_ok && rest_ok
}
