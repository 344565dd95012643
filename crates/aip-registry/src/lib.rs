//! Bidder registry: an immutable snapshot of bidder identities loaded
//! once at startup from a YAML inventory file (§4.2).

use std::path::Path;

use aip_types::BidderConfig;
use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read bidder inventory {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse bidder inventory: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Deserialize)]
struct InventoryFile {
    #[serde(default)]
    bidders: Vec<BidderConfig>,
}

/// Read-only after load; a `reload` swaps the whole snapshot atomically
/// by replacing the `Arc`-free owned map (the registry itself is meant to
/// live behind an `Arc<BidderRegistry>` in the server's shared state).
#[derive(Debug, Clone, Default)]
pub struct BidderRegistry {
    /// Insertion order from the inventory file is preserved: it's the
    /// tiebreak order named in §4.2.
    by_name: IndexMap<String, BidderConfig>,
}

impl BidderRegistry {
    pub fn from_entries(entries: Vec<BidderConfig>) -> Self {
        let mut by_name = IndexMap::new();
        for entry in entries {
            by_name.insert(entry.name.clone(), entry);
        }
        Self { by_name }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| RegistryError::Read { path: path.display().to_string(), source })?;
        let file: InventoryFile = serde_yaml::from_str(&text)?;
        Ok(Self::from_entries(file.bidders))
    }

    pub fn all(&self) -> impl Iterator<Item = &BidderConfig> {
        self.by_name.values()
    }

    pub fn get(&self, name: &str) -> Option<&BidderConfig> {
        self.by_name.get(name)
    }

    /// Every bidder whose pools intersect `pools`, in registry insertion
    /// order (§4.2).
    pub fn filter_by_pools(&self, pools: &[String]) -> Vec<BidderConfig> {
        self.by_name
            .values()
            .filter(|bidder| bidder.is_subscribed(pools))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
