//! Backend factories, grounded in
//! `original_source/app/storage/__init__.py::build_storage` and
//! `original_source/app/auction/fanout.py`'s backend switch.

use std::sync::Arc;

use aip_distribution::{LocalPublisher, ManagedTopicPublisher, Publisher};
use aip_store::backends::InMemoryRecordStore;
use aip_store::RecordStore;

use crate::config::{DistributionConfig, LedgerConfig};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("unknown storage backend {0}")]
    UnknownStorageBackend(String),
    #[error("unknown distribution backend {0}")]
    UnknownDistributionBackend(String),
    #[error("missing required option {0} for backend {1}")]
    MissingOption(String, String),
    #[error(transparent)]
    Store(#[from] aip_store::StoreError),
}

/// `build_storage(config)` (§6 `ledger.backend`): `in_memory` is always
/// available; `redis`/`postgres`/`document_store` require their Cargo
/// feature and connect eagerly so a misconfigured backend fails at
/// startup rather than on the first request.
pub async fn build_storage(config: &LedgerConfig) -> Result<Arc<dyn RecordStore>, BackendError> {
    match config.backend.as_str() {
        "in_memory" => Ok(Arc::new(InMemoryRecordStore::new())),
        "redis" => build_redis(config).await,
        "postgres" => build_postgres(config).await,
        "document_store" => build_document_store(config).await,
        other => Err(BackendError::UnknownStorageBackend(other.to_string())),
    }
}

#[cfg(feature = "redis-backend")]
async fn build_redis(config: &LedgerConfig) -> Result<Arc<dyn RecordStore>, BackendError> {
    let url = config
        .options
        .get("redis_url")
        .ok_or_else(|| BackendError::MissingOption("redis_url".to_string(), "redis".to_string()))?;
    let store = aip_store::backends::redis_backend::RedisRecordStore::connect(url).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "redis-backend"))]
async fn build_redis(_config: &LedgerConfig) -> Result<Arc<dyn RecordStore>, BackendError> {
    Err(BackendError::UnknownStorageBackend("redis (feature `redis-backend` not enabled)".to_string()))
}

#[cfg(feature = "postgres-backend")]
async fn build_postgres(config: &LedgerConfig) -> Result<Arc<dyn RecordStore>, BackendError> {
    let url = config
        .options
        .get("database_url")
        .ok_or_else(|| BackendError::MissingOption("database_url".to_string(), "postgres".to_string()))?;
    let store = aip_store::backends::postgres_backend::PostgresRecordStore::connect(url).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres-backend"))]
async fn build_postgres(_config: &LedgerConfig) -> Result<Arc<dyn RecordStore>, BackendError> {
    Err(BackendError::UnknownStorageBackend("postgres (feature `postgres-backend` not enabled)".to_string()))
}

#[cfg(feature = "document-store-backend")]
async fn build_document_store(config: &LedgerConfig) -> Result<Arc<dyn RecordStore>, BackendError> {
    let uri = config
        .options
        .get("connection_uri")
        .ok_or_else(|| BackendError::MissingOption("connection_uri".to_string(), "document_store".to_string()))?;
    let database = config.options.get("database").map(String::as_str).unwrap_or("aip");
    let store = aip_store::backends::document_store_backend::DocumentStoreRecordStore::connect(uri, database).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "document-store-backend"))]
async fn build_document_store(_config: &LedgerConfig) -> Result<Arc<dyn RecordStore>, BackendError> {
    Err(BackendError::UnknownStorageBackend(
        "document_store (feature `document-store-backend` not enabled)".to_string(),
    ))
}

/// `auction.distribution.backend` (§6): `local` never leaves the
/// process; `managed_topic` posts to the configured `base_url`/
/// `topic_prefix` (§4.3's Open Question resolution).
pub fn build_publisher(config: &DistributionConfig) -> Result<Arc<dyn Publisher>, BackendError> {
    match config.backend.as_str() {
        "local" => Ok(Arc::new(LocalPublisher)),
        "managed_topic" => {
            let base_url = config
                .options
                .get("base_url")
                .ok_or_else(|| BackendError::MissingOption("base_url".to_string(), "managed_topic".to_string()))?;
            let topic_prefix = config.options.get("topic_prefix").map(String::as_str).unwrap_or("aip-context");
            Ok(Arc::new(ManagedTopicPublisher::new(base_url.clone(), topic_prefix.to_string())))
        }
        other => Err(BackendError::UnknownDistributionBackend(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_backend_builds() {
        let config = LedgerConfig { backend: "in_memory".to_string(), options: Default::default() };
        build_storage(&config).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_backend_errors() {
        let config = LedgerConfig { backend: "carrier-pigeon".to_string(), options: Default::default() };
        let err = build_storage(&config).await.unwrap_err();
        assert!(matches!(err, BackendError::UnknownStorageBackend(_)));
    }

    #[test]
    fn local_publisher_builds_without_options() {
        let config = DistributionConfig { backend: "local".to_string(), options: Default::default() };
        build_publisher(&config).unwrap();
    }

    #[test]
    fn managed_topic_requires_base_url() {
        let config = DistributionConfig { backend: "managed_topic".to_string(), options: Default::default() };
        let err = build_publisher(&config).unwrap_err();
        assert!(matches!(err, BackendError::MissingOption(_, _)));
    }
}
