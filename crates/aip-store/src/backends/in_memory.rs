//! In-memory reference backend, grounded in
//! `original_source/app/storage/in_memory.py`: a single async mutex
//! guarding a map, values cloned in and out so callers never alias the
//! stored copy.

use std::collections::HashMap;
use std::sync::Mutex;

use aip_types::{LedgerRecord, RecommendationRecord};
use async_trait::async_trait;

use crate::{InsertOutcome, RecommendationStore, RecordStore, StoreError};

#[derive(Default)]
pub struct InMemoryRecordStore {
    records: Mutex<HashMap<String, LedgerRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create_record(&self, record: LedgerRecord) -> Result<LedgerRecord, StoreError> {
        let mut records = self.records.lock().expect("lock poisoned");
        records.insert(record.serve_token.clone(), record.clone());
        Ok(record)
    }

    async fn get_record(&self, serve_token: &str) -> Result<LedgerRecord, StoreError> {
        let records = self.records.lock().expect("lock poisoned");
        records
            .get(serve_token)
            .cloned()
            .ok_or_else(|| StoreError::RecordNotFound(serve_token.to_string()))
    }

    async fn put_record(&self, record: LedgerRecord) -> Result<LedgerRecord, StoreError> {
        let mut records = self.records.lock().expect("lock poisoned");
        if !records.contains_key(&record.serve_token) {
            return Err(StoreError::RecordNotFound(record.serve_token));
        }
        records.insert(record.serve_token.clone(), record.clone());
        Ok(record)
    }

    async fn list_records(&self) -> Result<Vec<LedgerRecord>, StoreError> {
        let records = self.records.lock().expect("lock poisoned");
        Ok(records.values().cloned().collect())
    }
}

fn composite_key(session_id: &str, message_id: &str) -> String {
    format!("{session_id}\u{0}{message_id}")
}

#[derive(Default)]
pub struct InMemoryRecommendationStore {
    records: Mutex<HashMap<String, RecommendationRecord>>,
}

impl InMemoryRecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecommendationStore for InMemoryRecommendationStore {
    async fn get(
        &self,
        session_id: &str,
        message_id: &str,
    ) -> Result<Option<RecommendationRecord>, StoreError> {
        let records = self.records.lock().expect("lock poisoned");
        Ok(records.get(&composite_key(session_id, message_id)).cloned())
    }

    async fn insert_if_absent(
        &self,
        record: RecommendationRecord,
    ) -> Result<InsertOutcome, StoreError> {
        let mut records = self.records.lock().expect("lock poisoned");
        let key = composite_key(&record.session_id, &record.message_id);
        match records.entry(key) {
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(InsertOutcome { record, inserted: true })
            }
            std::collections::hash_map::Entry::Occupied(slot) => {
                Ok(InsertOutcome { record: slot.get().clone(), inserted: false })
            }
        }
    }

    async fn put(&self, record: RecommendationRecord) -> Result<RecommendationRecord, StoreError> {
        let mut records = self.records.lock().expect("lock poisoned");
        let key = composite_key(&record.session_id, &record.message_id);
        records.insert(key, record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aip_types::RecommendationStatus;
    use chrono::Utc;

    fn sample_record(serve_token: &str) -> LedgerRecord {
        use aip_types::{ContextRequest, LedgerState};
        let context = ContextRequest {
            context_id: "ctx-1".into(),
            session_id: "sess-1".into(),
            platform_id: None,
            operator_id: None,
            query_text: None,
            locale: None,
            geo: None,
            timestamp: "2026-07-31T00:00:00Z".into(),
            intent: None,
            allowed_formats: vec![],
            auth: None,
            verticals: None,
            extensions: None,
            category_pools: None,
            categories: None,
            pools: None,
            context: None,
            features: None,
            request_id: None,
            serve_token_hint: None,
        };
        LedgerRecord {
            serve_token: serve_token.to_string(),
            auction_id: "auction-1".to_string(),
            state: LedgerState::Created,
            context,
            pools: vec![],
            eligible_bidders: vec![],
            bids: vec![],
            winner: None,
            clearing_price: None,
            no_bid: false,
            events: vec![],
            published_pools: vec![],
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemoryRecordStore::new();
        store.create_record(sample_record("tok-1")).await.unwrap();
        let fetched = store.get_record("tok-1").await.unwrap();
        assert_eq!(fetched.serve_token, "tok-1");
    }

    #[tokio::test]
    async fn get_missing_record_errors() {
        let store = InMemoryRecordStore::new();
        let err = store.get_record("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::RecordNotFound(_)));
    }

    #[tokio::test]
    async fn put_requires_existing_record() {
        let store = InMemoryRecordStore::new();
        let err = store.put_record(sample_record("tok-2")).await.unwrap_err();
        assert!(matches!(err, StoreError::RecordNotFound(_)));
    }

    #[tokio::test]
    async fn recommendation_insert_if_absent_is_idempotent() {
        let store = InMemoryRecommendationStore::new();
        let first = RecommendationRecord {
            session_id: "s1".into(),
            message_id: "m1".into(),
            status: RecommendationStatus::InProgress,
            query: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            weave_content: None,
            serve_token: None,
            creative_metadata: None,
            auction_result: None,
            error: None,
        };
        let mut second = first.clone();
        second.status = RecommendationStatus::Completed;

        let first_outcome = store.insert_if_absent(first.clone()).await.unwrap();
        assert!(first_outcome.inserted);
        assert_eq!(first_outcome.record.status, RecommendationStatus::InProgress);

        let raced = store.insert_if_absent(second).await.unwrap();
        assert!(!raced.inserted);
        assert_eq!(raced.record.status, RecommendationStatus::InProgress);
    }
}
