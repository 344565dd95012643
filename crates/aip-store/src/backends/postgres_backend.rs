//! Postgres-backed `RecordStore`, grounded in
//! `original_source/app/storage/postgres.py`'s single-table-of-JSON-documents
//! layout. `serve_token` is the primary key; the document column holds the
//! full `LedgerRecord` as `jsonb`.

use aip_types::LedgerRecord;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use crate::{RecordStore, StoreError};

pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS aip_ledger_records (\
                serve_token TEXT PRIMARY KEY, \
                document JSONB NOT NULL\
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn create_record(&self, record: LedgerRecord) -> Result<LedgerRecord, StoreError> {
        let document = serde_json::to_value(&record).map_err(|e| StoreError::Backend(e.to_string()))?;
        sqlx::query("INSERT INTO aip_ledger_records (serve_token, document) VALUES ($1, $2)")
            .bind(&record.serve_token)
            .bind(document)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(record)
    }

    async fn get_record(&self, serve_token: &str) -> Result<LedgerRecord, StoreError> {
        let row = sqlx::query("SELECT document FROM aip_ledger_records WHERE serve_token = $1")
            .bind(serve_token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .ok_or_else(|| StoreError::RecordNotFound(serve_token.to_string()))?;
        let document: serde_json::Value = row.try_get("document").map_err(|e| StoreError::Backend(e.to_string()))?;
        serde_json::from_value(document).map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn put_record(&self, record: LedgerRecord) -> Result<LedgerRecord, StoreError> {
        let document = serde_json::to_value(&record).map_err(|e| StoreError::Backend(e.to_string()))?;
        let result = sqlx::query("UPDATE aip_ledger_records SET document = $2 WHERE serve_token = $1")
            .bind(&record.serve_token)
            .bind(document)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RecordNotFound(record.serve_token));
        }
        Ok(record)
    }

    async fn list_records(&self) -> Result<Vec<LedgerRecord>, StoreError> {
        let rows = sqlx::query("SELECT document FROM aip_ledger_records")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        rows.into_iter()
            .map(|row| {
                let document: serde_json::Value =
                    row.try_get("document").map_err(|e| StoreError::Backend(e.to_string()))?;
                serde_json::from_value(document).map_err(|e| StoreError::Backend(e.to_string()))
            })
            .collect()
    }
}
