//! Auction Runner (§4.8): create → classify → register → publish →
//! collect → settle, one coroutine per auction.

use std::sync::Arc;

use aip_distribution::Publisher;
use aip_inbox::BidInbox;
use aip_ledger::LedgerService;
use aip_registry::BidderRegistry;
use aip_store::RecordStore;
use aip_types::{AipError, ContextRequest, LedgerRecord};
use serde_json::json;

use crate::pools;
use crate::selection::select_winner;

pub struct AuctionRunner<S: RecordStore + ?Sized, P: Publisher + ?Sized> {
    ledger: Arc<LedgerService<S>>,
    registry: Arc<BidderRegistry>,
    inbox: Arc<BidInbox>,
    publisher: Arc<P>,
    window_ms: u64,
}

impl<S: RecordStore + ?Sized, P: Publisher + ?Sized> AuctionRunner<S, P> {
    pub fn new(
        ledger: Arc<LedgerService<S>>,
        registry: Arc<BidderRegistry>,
        inbox: Arc<BidInbox>,
        publisher: Arc<P>,
        window_ms: u64,
    ) -> Self {
        Self { ledger, registry, inbox, publisher, window_ms }
    }

    pub async fn run(&self, context: ContextRequest) -> Result<LedgerRecord, AipError> {
        let record = self.ledger.create_record(context).await?;
        let serve_token = record.serve_token.clone();

        let pools = pools::classify(&record.context);
        let eligible = self.registry.filter_by_pools(&pools);
        let eligible_names: Vec<String> = eligible.iter().map(|b| b.name.clone()).collect();

        self.ledger
            .annotate_record(&serve_token, pools.clone(), eligible_names.clone())
            .await?;
        self.inbox.register(&serve_token, eligible_names.clone()).await;

        let fanout_payload = json!({
            "auction_id": record.auction_id,
            "serve_token": serve_token,
            "pools": pools,
            "context_request": record.context,
            "bidders": eligible_names,
        });
        let outcome =
            aip_distribution::fanout(self.publisher.as_ref(), &record.auction_id, &pools, &fanout_payload).await;
        for pool in &outcome.published {
            self.ledger.mark_published(&serve_token, pool).await?;
        }
        for (pool, err) in &outcome.failed {
            tracing::warn!(serve_token = %serve_token, pool = %pool, error = %err, "pool publish failed");
        }

        let bids = self.inbox.collect(&serve_token, self.window_ms).await;
        if bids.is_empty() {
            return self.ledger.record_no_bid(&serve_token).await;
        }
        let winner = select_winner(&bids);
        self.ledger.settle_auction(&serve_token, &bids, winner).await
    }
}
