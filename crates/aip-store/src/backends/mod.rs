pub mod in_memory;

#[cfg(feature = "redis-backend")]
pub mod redis_backend;

#[cfg(feature = "postgres-backend")]
pub mod postgres_backend;

#[cfg(feature = "document-store-backend")]
pub mod document_store_backend;

pub use in_memory::{InMemoryRecommendationStore, InMemoryRecordStore};
