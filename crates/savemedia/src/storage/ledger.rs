//! In-memory ledger of pending download choices.
//!
//! A preview message carries buttons whose callback data holds a short
//! opaque id. The callback arrives later, as a separate stateless event,
//! and this ledger is what joins it back to the original URL. Entries are
//! bounded two ways: a TTL, and a capacity cap that evicts the oldest
//! entry, so abandoned choices never accumulate for the life of the
//! process.

use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use url::Url;
use uuid::Uuid;

use crate::classify::Platform;
use crate::core::config;

/// One pending choice, waiting for its button press.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub url: Url,
    pub platform: Platform,
    created_at: Instant,
}

/// Mapping of live request ids to pending requests.
///
/// All access goes through one async mutex; `consume` is the only read
/// path, and it removes the entry in the same critical section, so two
/// concurrent presses of the same button can never both start a download.
pub struct RequestLedger {
    entries: Mutex<HashMap<String, PendingRequest>>,
    ttl: Duration,
    capacity: usize,
}

impl RequestLedger {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Ledger with the configured TTL and capacity.
    pub fn with_defaults() -> Self {
        Self::new(config::ledger::ttl(), *config::ledger::CAPACITY)
    }

    /// Inserts a new entry and returns its fresh id.
    ///
    /// At capacity the oldest entry is evicted first, so a flood of
    /// presented-but-never-pressed previews cannot grow the map.
    pub async fn create(&self, url: Url, platform: Platform) -> String {
        let mut entries = self.entries.lock().await;

        if entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(id, _)| id.clone());
            if let Some(id) = oldest {
                entries.remove(&id);
                log::debug!("Ledger at capacity ({}), evicted oldest entry {}", self.capacity, id);
            }
        }

        // Ids are never reused while an entry is live; regenerate on the
        // (vanishingly rare) collision instead of relying on probability.
        let id = loop {
            let candidate = short_request_id();
            if !entries.contains_key(&candidate) {
                break candidate;
            }
        };

        entries.insert(
            id.clone(),
            PendingRequest {
                url,
                platform,
                created_at: Instant::now(),
            },
        );
        log::debug!("Ledger entry created: {} ({} pending)", id, entries.len());

        id
    }

    /// Atomically looks up and removes an entry.
    ///
    /// Exactly one of N concurrent calls with the same id gets `Some`;
    /// the rest see `None`. An entry past its TTL also answers `None`
    /// (and is dropped on the way out).
    pub async fn consume(&self, id: &str) -> Option<PendingRequest> {
        let mut entries = self.entries.lock().await;
        let entry = entries.remove(id)?;

        if entry.created_at.elapsed() >= self.ttl {
            log::debug!("Ledger entry {} expired before use", id);
            return None;
        }

        Some(entry)
    }

    /// Removes an entry without using it, for flows that abort before a
    /// callback can arrive.
    pub async fn discard(&self, id: &str) {
        let mut entries = self.entries.lock().await;
        if entries.remove(id).is_some() {
            log::debug!("Ledger entry discarded: {}", id);
        }
    }

    /// Drops all entries past the TTL. The background sweeper calls this
    /// on an interval.
    pub async fn evict_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.created_at.elapsed() < self.ttl);
        let removed = before - entries.len();
        if removed > 0 {
            log::debug!("Evicted {} expired ledger entries ({} left)", removed, entries.len());
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

/// Short opaque id: the first 8 hex chars of a v4 UUID. Collisions within
/// the pending set are handled by the caller's regenerate loop.
fn short_request_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> RequestLedger {
        RequestLedger::new(Duration::from_secs(60), 100)
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_consume() {
        let ledger = ledger();
        let id = ledger.create(url("https://youtu.be/abc123"), Platform::YouTube).await;
        assert_eq!(id.len(), 8);

        let entry = ledger.consume(&id).await.unwrap();
        assert_eq!(entry.url.as_str(), "https://youtu.be/abc123");
        assert_eq!(entry.platform, Platform::YouTube);
        assert!(ledger.is_empty().await);
    }

    #[tokio::test]
    async fn test_consume_is_at_most_once() {
        let ledger = ledger();
        let id = ledger.create(url("https://youtu.be/abc123"), Platform::YouTube).await;

        assert!(ledger.consume(&id).await.is_some());
        assert!(ledger.consume(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_consume_unknown_id() {
        let ledger = ledger();
        assert!(ledger.consume("deadbeef").await.is_none());
    }

    #[tokio::test]
    async fn test_discard_removes_without_use() {
        let ledger = ledger();
        let id = ledger
            .create(url("https://instagram.com/reel/x/"), Platform::Instagram)
            .await;

        ledger.discard(&id).await;
        assert!(ledger.consume(&id).await.is_none());
        // Discarding twice is harmless
        ledger.discard(&id).await;
    }

    #[tokio::test]
    async fn test_expired_entry_is_not_resolvable() {
        let ledger = RequestLedger::new(Duration::from_millis(10), 100);
        let id = ledger.create(url("https://youtu.be/abc123"), Platform::YouTube).await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(ledger.consume(&id).await.is_none());
        assert!(ledger.is_empty().await);
    }

    #[tokio::test]
    async fn test_evict_expired_sweeps_old_entries() {
        let ledger = RequestLedger::new(Duration::from_millis(10), 100);
        ledger.create(url("https://youtu.be/a"), Platform::YouTube).await;
        ledger.create(url("https://youtu.be/b"), Platform::YouTube).await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        let fresh = ledger.create(url("https://youtu.be/c"), Platform::YouTube).await;

        assert_eq!(ledger.evict_expired().await, 2);
        assert_eq!(ledger.len().await, 1);
        assert!(ledger.consume(&fresh).await.is_some());
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let ledger = RequestLedger::new(Duration::from_secs(60), 2);
        let first = ledger.create(url("https://youtu.be/a"), Platform::YouTube).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = ledger.create(url("https://youtu.be/b"), Platform::YouTube).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let third = ledger.create(url("https://youtu.be/c"), Platform::YouTube).await;

        assert_eq!(ledger.len().await, 2);
        assert!(ledger.consume(&first).await.is_none());
        assert!(ledger.consume(&second).await.is_some());
        assert!(ledger.consume(&third).await.is_some());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let ledger = ledger();
        let a = ledger.create(url("https://youtu.be/a"), Platform::YouTube).await;
        let b = ledger.create(url("https://youtu.be/a"), Platform::YouTube).await;
        assert_ne!(a, b);
    }
}
