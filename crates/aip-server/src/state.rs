//! Shared server state, built once in `main` and threaded explicitly
//! through every route (§9 "Ambient singletons": no hidden globals).

use std::sync::Arc;
use std::time::Duration;

use aip_auction::AuctionRunner;
use aip_distribution::Publisher;
use aip_inbox::BidInbox;
use aip_ledger::LedgerService;
use aip_registry::BidderRegistry;
use aip_store::backends::InMemoryRecommendationStore;
use aip_store::{RecommendationStore, RecordStore};
use aip_transport::NonceCache;
use aip_validation::{PermissiveValidator, SchemaValidator};
use aip_weave::WeaveCoordinator;

use crate::backend::{build_publisher, build_storage, BackendError};
use crate::config::ServerConfig;

pub struct AppState {
    pub config: ServerConfig,
    pub registry: Arc<BidderRegistry>,
    pub nonce_cache: Arc<NonceCache>,
    pub store: Arc<dyn RecordStore>,
    pub ledger: Arc<LedgerService<dyn RecordStore>>,
    pub inbox: Arc<BidInbox>,
    pub runner: Arc<AuctionRunner<dyn RecordStore, dyn Publisher>>,
    pub weave: Arc<WeaveCoordinator<dyn RecommendationStore, dyn RecordStore, dyn Publisher>>,
    pub validator: Arc<dyn SchemaValidator>,
}

#[derive(Debug, thiserror::Error)]
pub enum StateBuildError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Registry(#[from] aip_registry::RegistryError),
}

impl AppState {
    pub async fn build(config: ServerConfig) -> Result<Self, StateBuildError> {
        let registry = if std::path::Path::new(&config.bidders_path).exists() {
            Arc::new(BidderRegistry::load_from_path(config.bidders_path())?)
        } else {
            Arc::new(BidderRegistry::default())
        };

        let nonce_cache = Arc::new(NonceCache::new(Duration::from_secs(config.transport.nonce_ttl_seconds)));
        let store = build_storage(&config.ledger).await?;
        let ledger = Arc::new(LedgerService::new(store.clone()));
        let inbox = Arc::new(BidInbox::new());
        let publisher = build_publisher(&config.auction.distribution)?;
        let runner =
            Arc::new(AuctionRunner::new(ledger.clone(), registry.clone(), inbox.clone(), publisher, config.auction.window_ms));

        let recommendation_store: Arc<dyn RecommendationStore> = Arc::new(InMemoryRecommendationStore::new());
        let weave = Arc::new(WeaveCoordinator::new(recommendation_store, runner.clone()));

        let validator: Arc<dyn SchemaValidator> = build_validator(&config);

        Ok(Self { config, registry, nonce_cache, store, ledger, inbox, runner, weave, validator })
    }
}

#[cfg(feature = "jsonschema-backend")]
fn build_validator(config: &ServerConfig) -> Arc<dyn SchemaValidator> {
    match &config.schema_dir {
        Some(dir) => match aip_validation::jsonschema_backend::JsonSchemaValidator::load_dir(dir) {
            Ok(validator) => Arc::new(validator),
            Err(err) => {
                tracing::warn!(schema_dir = %dir, error = %err, "failed to load json schemas, falling back to permissive validation");
                Arc::new(PermissiveValidator)
            }
        },
        None => Arc::new(PermissiveValidator),
    }
}

#[cfg(not(feature = "jsonschema-backend"))]
fn build_validator(_config: &ServerConfig) -> Arc<dyn SchemaValidator> {
    Arc::new(PermissiveValidator)
}
