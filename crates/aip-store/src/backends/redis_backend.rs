//! Redis-backed `RecordStore`, grounded in
//! `original_source/app/storage/redis.py`'s key-per-record layout.
//! Records are stored as JSON strings under `aip:record:{serve_token}`;
//! `list_records` relies on a companion set tracking known keys, since
//! `KEYS`/`SCAN` over the whole keyspace would be unsafe in production.

use aip_types::LedgerRecord;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::{RecordStore, StoreError};

const INDEX_KEY: &str = "aip:records:index";

fn record_key(serve_token: &str) -> String {
    format!("aip:record:{serve_token}")
}

pub struct RedisRecordStore {
    conn: ConnectionManager,
}

impl RedisRecordStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl RecordStore for RedisRecordStore {
    async fn create_record(&self, record: LedgerRecord) -> Result<LedgerRecord, StoreError> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(&record).map_err(|e| StoreError::Backend(e.to_string()))?;
        let () = conn
            .set(record_key(&record.serve_token), payload)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let _: i64 = conn
            .sadd(INDEX_KEY, &record.serve_token)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(record)
    }

    async fn get_record(&self, serve_token: &str) -> Result<LedgerRecord, StoreError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn
            .get(record_key(serve_token))
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let payload = payload.ok_or_else(|| StoreError::RecordNotFound(serve_token.to_string()))?;
        serde_json::from_str(&payload).map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn put_record(&self, record: LedgerRecord) -> Result<LedgerRecord, StoreError> {
        self.get_record(&record.serve_token).await?;
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(&record).map_err(|e| StoreError::Backend(e.to_string()))?;
        let () = conn
            .set(record_key(&record.serve_token), payload)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(record)
    }

    async fn list_records(&self) -> Result<Vec<LedgerRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let tokens: Vec<String> = conn
            .smembers(INDEX_KEY)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut out = Vec::with_capacity(tokens.len());
        for token in tokens {
            out.push(self.get_record(&token).await?);
        }
        Ok(out)
    }
}
