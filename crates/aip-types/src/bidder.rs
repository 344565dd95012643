use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Immutable bidder identity loaded once at startup from the registry
/// inventory (§3, §4.2). `pools` defaults to `{"default"}` when the
/// inventory entry omits it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BidderConfig {
    pub name: String,
    pub endpoint: String,
    /// PEM-encoded Ed25519 public key.
    pub public_key: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_pools")]
    pub pools: BTreeSet<String>,
}

fn default_timeout_ms() -> u64 {
    200
}

fn default_pools() -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    set.insert("default".to_string());
    set
}

impl BidderConfig {
    pub fn is_subscribed(&self, pools: &[String]) -> bool {
        pools.iter().any(|p| self.pools.contains(p))
    }
}
