//! Record Store abstraction (§4.4) and Recommendation Store (§4.9).
//!
//! The in-memory backend is the reference implementation exercised by
//! every other crate's tests; `redis`/`postgres`/`document_store`
//! backends sit behind Cargo features and speak to real crates, since
//! `ledger.backend` (§6) names all four.

pub mod backends;
pub mod error;

pub use error::StoreError;

use aip_types::{LedgerRecord, RecommendationRecord};
use async_trait::async_trait;

/// Storage for ledger records. `serve_token` is the sole primary key
/// (§3); `auction_id` is just another field on the document.
///
/// `#[auto_impl(Arc)]` lets `Arc<dyn RecordStore>` be used directly
/// wherever an owned store is expected, matching the shared-handle
/// pattern used throughout the workspace.
#[async_trait]
#[auto_impl::auto_impl(Arc)]
pub trait RecordStore: Send + Sync {
    async fn create_record(&self, record: LedgerRecord) -> Result<LedgerRecord, StoreError>;

    async fn get_record(&self, serve_token: &str) -> Result<LedgerRecord, StoreError>;

    /// Replaces the stored record wholesale; callers pass the full
    /// mutated record rather than a partial patch, since `LedgerRecord`
    /// has no concept of a sparse update.
    async fn put_record(&self, record: LedgerRecord) -> Result<LedgerRecord, StoreError>;

    async fn list_records(&self) -> Result<Vec<LedgerRecord>, StoreError>;
}

/// Outcome of a conditional insert: `inserted = true` when this call's
/// record is the one now stored; `false` when a concurrent caller won
/// the race and `record` is theirs.
pub struct InsertOutcome {
    pub record: RecommendationRecord,
    pub inserted: bool,
}

/// Storage for recommendation records, keyed by `(session_id, message_id)`.
#[async_trait]
#[auto_impl::auto_impl(Arc)]
pub trait RecommendationStore: Send + Sync {
    async fn get(
        &self,
        session_id: &str,
        message_id: &str,
    ) -> Result<Option<RecommendationRecord>, StoreError>;

    /// Inserts `record` only if the key is absent — the conditional-insert
    /// primitive the weave coordinator's single-flight dedup relies on
    /// (§4.9).
    async fn insert_if_absent(
        &self,
        record: RecommendationRecord,
    ) -> Result<InsertOutcome, StoreError>;

    async fn put(&self, record: RecommendationRecord) -> Result<RecommendationRecord, StoreError>;
}
