//! Document-store-backed `RecordStore`, grounded in
//! `original_source/app/storage/firestore.py`'s one-document-per-record
//! layout. No Firestore Rust crate exists in the example pack's stack, so
//! `document_store` is implemented against `mongodb`, a document store with
//! equivalent collection/document semantics.

use aip_types::LedgerRecord;
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::{Client, Collection};

use crate::{RecordStore, StoreError};

pub struct DocumentStoreRecordStore {
    collection: Collection<LedgerRecord>,
}

impl DocumentStoreRecordStore {
    pub async fn connect(connection_uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(connection_uri)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let collection = client.database(database).collection("aip_ledger_records");
        Ok(Self { collection })
    }
}

#[async_trait]
impl RecordStore for DocumentStoreRecordStore {
    async fn create_record(&self, record: LedgerRecord) -> Result<LedgerRecord, StoreError> {
        self.collection
            .insert_one(&record)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(record)
    }

    async fn get_record(&self, serve_token: &str) -> Result<LedgerRecord, StoreError> {
        self.collection
            .find_one(doc! { "serve_token": serve_token })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .ok_or_else(|| StoreError::RecordNotFound(serve_token.to_string()))
    }

    async fn put_record(&self, record: LedgerRecord) -> Result<LedgerRecord, StoreError> {
        let result = self
            .collection
            .replace_one(doc! { "serve_token": &record.serve_token }, &record)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        if result.matched_count == 0 {
            return Err(StoreError::RecordNotFound(record.serve_token));
        }
        Ok(record)
    }

    async fn list_records(&self) -> Result<Vec<LedgerRecord>, StoreError> {
        use futures_util::TryStreamExt;
        let cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}
