//! Server configuration, grounded in
//! `original_source/app/config/__init__.py::get_server_config`: a YAML
//! file whose path is overridable by an environment pointer, with the
//! same defaults as the source (§6 "Configuration").

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_PATH_ENV: &str = "AIP_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "./config/server.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_nonce_ttl_seconds")]
    pub nonce_ttl_seconds: u64,
    #[serde(default = "default_max_clock_skew_ms")]
    pub max_clock_skew_ms: i64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { nonce_ttl_seconds: default_nonce_ttl_seconds(), max_clock_skew_ms: default_max_clock_skew_ms() }
    }
}

fn default_nonce_ttl_seconds() -> u64 {
    60
}

fn default_max_clock_skew_ms() -> i64 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_backend")]
    pub backend: String,
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { backend: default_ledger_backend(), options: HashMap::new() }
    }
}

fn default_ledger_backend() -> String {
    "in_memory".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionConfig {
    #[serde(default = "default_distribution_backend")]
    pub backend: String,
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self { backend: default_distribution_backend(), options: HashMap::new() }
    }
}

fn default_distribution_backend() -> String {
    "local".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuctionConfig {
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    #[serde(default)]
    pub distribution: DistributionConfig,
}

fn default_window_ms() -> u64 {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    #[serde(default = "default_operator_id", rename = "id")]
    pub operator_id: String,
    #[serde(default = "default_allowed_formats")]
    pub allowed_formats: Vec<String>,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self { operator_id: default_operator_id(), allowed_formats: default_allowed_formats() }
    }
}

fn default_operator_id() -> String {
    "operator".to_string()
}

fn default_allowed_formats() -> Vec<String> {
    vec!["weave".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub auction: AuctionConfig,
    #[serde(default)]
    pub operator: OperatorConfig,
    /// Not part of §6's recognized key list; ambient addition so the
    /// `jsonschema-backend` feature has somewhere to load schemas from.
    #[serde(default)]
    pub schema_dir: Option<String>,
    /// Registry inventory file path, separate from `AIP_BIDDERS_PATH`'s
    /// source-side env var since the workspace threads config explicitly
    /// rather than through ambient globals (§9 "Ambient singletons").
    #[serde(default = "default_bidders_path")]
    pub bidders_path: String,
}

fn default_bidders_path() -> String {
    "./config/bidders.yaml".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, source: serde_yaml::Error },
}

impl ServerConfig {
    /// Loads from `AIP_CONFIG_PATH`, defaulting to `./config/server.yaml`.
    /// A missing file is not an error: every field has a default matching
    /// the source's own defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        serde_yaml::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
    }

    pub fn bidders_path(&self) -> PathBuf {
        PathBuf::from(&self.bidders_path)
    }
}
