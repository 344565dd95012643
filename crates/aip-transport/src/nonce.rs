//! TTL-bounded anti-replay nonce cache (§4.1, §5).
//!
//! One mutex guards both the eviction deque and the membership set;
//! `assert_fresh` evicts expired entries before checking membership, so
//! each check is O(1) amortized.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use aip_types::AipError;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

struct NonceEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct NonceState {
    order: VecDeque<NonceEntry>,
    known: HashSet<String>,
}

pub struct NonceCache {
    ttl: Duration,
    state: Mutex<NonceState>,
}

impl NonceCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, state: Mutex::new(NonceState::default()) }
    }

    /// Evicts expired entries, rejects an empty or already-seen nonce,
    /// then records it with a fresh expiry (§4.1).
    pub async fn assert_fresh(&self, nonce: &str) -> Result<(), AipError> {
        if nonce.is_empty() {
            return Err(AipError::NonceMissing);
        }
        let mut state = self.state.lock().await;
        let now = Utc::now();
        Self::evict_expired(&mut state, now);
        if state.known.contains(nonce) {
            return Err(AipError::NonceReplay);
        }
        let expires_at = now + chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::zero());
        state.known.insert(nonce.to_string());
        state.order.push_back(NonceEntry { value: nonce.to_string(), expires_at });
        Ok(())
    }

    fn evict_expired(state: &mut NonceState, now: DateTime<Utc>) {
        while let Some(front) = state.order.front() {
            if front.expires_at > now {
                break;
            }
            let expired = state.order.pop_front().expect("front just peeked");
            state.known.remove(&expired.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn distinct_nonces_all_succeed() {
        let cache = NonceCache::new(Duration::from_secs(60));
        cache.assert_fresh("a").await.unwrap();
        cache.assert_fresh("b").await.unwrap();
        cache.assert_fresh("c").await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_within_ttl_fails() {
        let cache = NonceCache::new(Duration::from_secs(60));
        cache.assert_fresh("dup").await.unwrap();
        let err = cache.assert_fresh("dup").await.unwrap_err();
        assert_eq!(err, AipError::NonceReplay);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_after_ttl_elapses_succeeds() {
        let cache = NonceCache::new(Duration::from_millis(10));
        cache.assert_fresh("n").await.unwrap();
        tokio::time::advance(Duration::from_millis(20)).await;
        cache.assert_fresh("n").await.unwrap();
    }

    #[tokio::test]
    async fn empty_nonce_is_rejected() {
        let cache = NonceCache::new(Duration::from_secs(60));
        let err = cache.assert_fresh("").await.unwrap_err();
        assert_eq!(err, AipError::NonceMissing);
    }
}
