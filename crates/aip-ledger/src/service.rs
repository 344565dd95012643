//! Ledger lifecycle orchestration (§4.4), grounded in
//! `original_source/app/ledger/apply.py::LedgerService`.

use std::sync::Arc;

use aip_store::RecordStore;
use aip_types::{
    AipError, ContextRequest, EventRecord, EventType, LedgerEvent, LedgerRecord, LedgerState,
};
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::billing::{self, LedgerBid};
use crate::error::from_store;
use crate::fsm;

pub struct LedgerService<S: RecordStore + ?Sized> {
    store: Arc<S>,
}

impl<S: RecordStore + ?Sized> LedgerService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Generates a fresh `serve_token`: `{hint}-{8 hex}` when the
    /// platform supplied a `serve_token_hint`, else `stk_{32 hex}` —
    /// both well past the 128-bit entropy floor in §4.4.
    fn generate_serve_token(hint: Option<&str>) -> String {
        match hint {
            Some(hint) => format!("{hint}-{}", &Uuid::new_v4().simple().to_string()[..8]),
            None => format!("stk_{}", Uuid::new_v4().simple()),
        }
    }

    pub async fn create_record(&self, context: ContextRequest) -> Result<LedgerRecord, AipError> {
        let auction_id = context
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let serve_token = Self::generate_serve_token(context.serve_token_hint.as_deref());
        let record = LedgerRecord {
            serve_token,
            auction_id,
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
        };
        self.store.create_record(record).await.map_err(from_store)
    }

    /// Attaches `pools`/`eligible_bidders` after classification, without
    /// a state transition (§4.4's `Annotate`).
    pub async fn annotate_record(
        &self,
        serve_token: &str,
        pools: Vec<String>,
        eligible_bidders: Vec<String>,
    ) -> Result<LedgerRecord, AipError> {
        let mut record = self.store.get_record(serve_token).await.map_err(from_store)?;
        record.pools = pools;
        record.eligible_bidders = eligible_bidders;
        self.store.put_record(record).await.map_err(from_store)
    }

    pub async fn mark_published(
        &self,
        serve_token: &str,
        pool: &str,
    ) -> Result<LedgerRecord, AipError> {
        let mut record = self.store.get_record(serve_token).await.map_err(from_store)?;
        if !record.published_pools.iter().any(|p| p == pool) {
            record.published_pools.push(pool.to_string());
        }
        self.store.put_record(record).await.map_err(from_store)
    }

    pub async fn settle_auction(
        &self,
        serve_token: &str,
        bids: &[aip_types::BidResponse],
        winner: Option<&aip_types::BidResponse>,
    ) -> Result<LedgerRecord, AipError> {
        let mut record = self.store.get_record(serve_token).await.map_err(from_store)?;
        let new_state = fsm::transition(record.state, LedgerEvent::AuctionSettled)?;

        let ledger_bids: Vec<LedgerBid> = bids.iter().map(LedgerBid::from).collect();
        let winner_bid = winner.map(LedgerBid::from);
        let price = billing::clearing_price(&ledger_bids, winner_bid.as_ref());

        record.state = new_state;
        record.bids = bids.iter().map(|b| b.payload.clone()).collect();
        record.winner = winner.map(|w| w.payload.clone());
        record.clearing_price = Some(billing::clearing_price_wire(price));
        self.store.put_record(record).await.map_err(from_store)
    }

    pub async fn record_no_bid(&self, serve_token: &str) -> Result<LedgerRecord, AipError> {
        let mut record = self.store.get_record(serve_token).await.map_err(from_store)?;
        let new_state = fsm::transition(record.state, LedgerEvent::NoBidRecorded)?;
        record.state = new_state;
        record.no_bid = true;
        record.bids = vec![];
        record.winner = None;
        record.clearing_price = Some(billing::clearing_price_wire(Decimal::ZERO));
        self.store.put_record(record).await.map_err(from_store)
    }

    /// Appends a billing event under the single-charge rule (§4.4).
    pub async fn record_event(
        &self,
        serve_token: &str,
        event_type: EventType,
        payload: serde_json::Value,
    ) -> Result<LedgerRecord, AipError> {
        let mut record = self.store.get_record(serve_token).await.map_err(from_store)?;

        if record.no_bid {
            return Err(AipError::NoBidNoEvents);
        }

        let priority = event_type.priority();
        let recorded = record.max_recorded_priority();
        if priority <= recorded {
            return Err(AipError::SingleChargeViolation { incoming: priority, recorded });
        }

        let new_state = fsm::transition(record.state, LedgerEvent::EventIngested)?;
        record.state = new_state;
        record.events.push(EventRecord {
            event_type,
            priority,
            payload,
            recorded_at: Utc::now(),
        });
        self.store.put_record(record).await.map_err(from_store)
    }

    pub async fn get_record(&self, serve_token: &str) -> Result<LedgerRecord, AipError> {
        self.store.get_record(serve_token).await.map_err(from_store)
    }

    pub async fn list_records(&self) -> Result<Vec<LedgerRecord>, AipError> {
        self.store.list_records().await.map_err(from_store)
    }
}
