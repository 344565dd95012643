//! Bid Response Inbox (§4.5): per-auction allow-list plus a bounded
//! collection window, grounded in the concurrency contract of
//! `original_source/app/auction/runner.py`'s `Inbox.Register` /
//! `Inbox.Add` / `Inbox.Collect` sequence (the Python source keeps this
//! state inline in the runner; here it is its own crate so the
//! sleep-outside-the-lock contract is independently testable).

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use aip_types::{AipError, BidResponse};
use tokio::sync::Mutex;

struct AuctionInbox {
    allowed: HashSet<String>,
    responses: Vec<BidResponse>,
}

#[derive(Default)]
pub struct BidInbox {
    auctions: Mutex<HashMap<String, AuctionInbox>>,
}

impl BidInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, auction_id: &str, bidders: Vec<String>) {
        let mut auctions = self.auctions.lock().await;
        auctions.insert(
            auction_id.to_string(),
            AuctionInbox { allowed: bidders.into_iter().collect(), responses: Vec::new() },
        );
    }

    pub async fn add(&self, auction_id: &str, response: BidResponse) -> Result<(), AipError> {
        let mut auctions = self.auctions.lock().await;
        let inbox = auctions.get_mut(auction_id).ok_or(AipError::AuctionNotActive)?;
        if !inbox.allowed.contains(&response.bidder) {
            return Err(AipError::NotSubscribed);
        }
        inbox.responses.push(response);
        Ok(())
    }

    /// Sleeps `window_ms` outside the lock — concurrent `add` calls
    /// during the window are accepted — then atomically drains the
    /// response list and discards the allow-list.
    pub async fn collect(&self, auction_id: &str, window_ms: u64) -> Vec<BidResponse> {
        tokio::time::sleep(Duration::from_millis(window_ms)).await;
        let mut auctions = self.auctions.lock().await;
        match auctions.remove(auction_id) {
            Some(inbox) => inbox.responses,
            None => Vec::new(),
        }
    }
}
