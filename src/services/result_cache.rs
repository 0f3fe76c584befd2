use crate::models::DomainRecord;
use crate::services::domain_utils::normalize_domain;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Last lookup result kept for a domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub record: DomainRecord,
    pub trust_score: u8,
    pub checked_at: DateTime<Utc>,
    // insertion order, breaks ties between identical timestamps
    #[serde(skip)]
    pub sequence: u64,
}

impl CacheEntry {
    fn recency(&self) -> (DateTime<Utc>, u64) {
        (self.checked_at, self.sequence)
    }
}

/// Decides which entries leave the cache after each insert. `newest` is the
/// key just written; a policy must never remove it.
pub trait EvictionPolicy: Send + Sync {
    fn evict(&self, entries: &mut HashMap<String, CacheEntry>, newest: &str);
}

/// Keeps everything for the lifetime of the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverEvict;

impl EvictionPolicy for NeverEvict {
    fn evict(&self, _entries: &mut HashMap<String, CacheEntry>, _newest: &str) {}
}

/// Keeps at most `n` domains, dropping the least recently checked.
#[derive(Debug, Clone, Copy)]
pub struct MaxEntries(pub usize);

impl EvictionPolicy for MaxEntries {
    fn evict(&self, entries: &mut HashMap<String, CacheEntry>, newest: &str) {
        let limit = self.0.max(1);
        if entries.len() <= limit {
            return;
        }

        let mut by_age: Vec<(String, (DateTime<Utc>, u64))> = entries
            .iter()
            .filter(|(domain, _)| domain.as_str() != newest)
            .map(|(domain, entry)| (domain.clone(), entry.recency()))
            .collect();
        by_age.sort_by_key(|(_, recency)| *recency);

        let excess = entries.len() - limit;
        for (domain, _) in by_age.into_iter().take(excess) {
            debug!(domain = %domain, "Evicting cached result");
            entries.remove(&domain);
        }
    }
}

/// Process-wide map of domain to its most recent lookup. Writes overwrite,
/// last write wins, and nothing here is used to compute a response.
pub struct ResultCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    next_sequence: AtomicU64,
    policy: Box<dyn EvictionPolicy>,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    pub fn new() -> Self {
        Self::with_policy(NeverEvict)
    }

    pub fn with_policy(policy: impl EvictionPolicy + 'static) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_sequence: AtomicU64::new(0),
            policy: Box::new(policy),
        }
    }

    pub async fn insert(&self, record: DomainRecord, trust_score: u8, checked_at: DateTime<Utc>) {
        let mut entries = self.entries.write().await;
        let domain = record.domain.clone();
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        entries.insert(
            domain.clone(),
            CacheEntry {
                record,
                trust_score,
                checked_at,
                sequence,
            },
        );
        self.policy.evict(&mut entries, &domain);
    }

    pub async fn get(&self, domain: &str) -> Option<CacheEntry> {
        self.entries
            .read()
            .await
            .get(&normalize_domain(domain))
            .cloned()
    }

    /// All entries, most recently checked first.
    pub async fn entries(&self) -> Vec<CacheEntry> {
        let mut entries: Vec<CacheEntry> = self.entries.read().await.values().cloned().collect();
        entries.sort_by_key(|entry| std::cmp::Reverse(entry.recency()));
        entries
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(domain: &str) -> DomainRecord {
        DomainRecord::new(domain)
    }

    #[tokio::test]
    async fn test_insert_overwrites_previous_result() {
        let cache = ResultCache::new();
        let now = Utc::now();

        cache.insert(record("example.com"), 40, now).await;
        cache
            .insert(record("example.com"), 65, now + Duration::seconds(5))
            .await;

        assert_eq!(cache.len().await, 1);
        let entry = cache.get("WWW.example.com").await.unwrap();
        assert_eq!(entry.trust_score, 65);
        assert_eq!(entry.checked_at, now + Duration::seconds(5));
    }

    #[tokio::test]
    async fn test_never_evict_keeps_everything() {
        let cache = ResultCache::new();
        let now = Utc::now();
        for i in 0..50 {
            cache
                .insert(record(&format!("site{}.com", i)), 50, now)
                .await;
        }
        assert_eq!(cache.len().await, 50);
    }

    #[tokio::test]
    async fn test_max_entries_drops_oldest() {
        let cache = ResultCache::with_policy(MaxEntries(2));
        let now = Utc::now();

        cache.insert(record("a.com"), 10, now).await;
        cache.insert(record("b.com"), 20, now + Duration::seconds(1)).await;
        cache.insert(record("c.com"), 30, now + Duration::seconds(2)).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get("a.com").await.is_none());

        let domains: Vec<String> = cache
            .entries()
            .await
            .into_iter()
            .map(|e| e.record.domain)
            .collect();
        assert_eq!(domains, vec!["c.com", "b.com"]);
    }

    #[tokio::test]
    async fn test_max_entries_keeps_latest_on_equal_timestamps() {
        let now = Utc::now();
        for _ in 0..50 {
            let cache = ResultCache::with_policy(MaxEntries(1));
            cache.insert(record("a.com"), 10, now).await;
            cache.insert(record("b.com"), 20, now).await;

            assert_eq!(cache.len().await, 1);
            assert!(cache.get("b.com").await.is_some());
        }
    }

    #[tokio::test]
    async fn test_max_entries_keeps_late_insert_with_older_timestamp() {
        let cache = ResultCache::with_policy(MaxEntries(1));
        let now = Utc::now();

        cache.insert(record("a.com"), 10, now).await;
        // a slow lookup started earlier finishes last
        cache.insert(record("b.com"), 20, now - Duration::seconds(3)).await;

        assert!(cache.get("b.com").await.is_some());
        assert!(cache.get("a.com").await.is_none());
    }

    #[tokio::test]
    async fn test_entries_order_ties_by_insertion() {
        let cache = ResultCache::new();
        let now = Utc::now();
        for domain in ["a.com", "b.com", "c.com"] {
            cache.insert(record(domain), 50, now).await;
        }

        let domains: Vec<String> = cache
            .entries()
            .await
            .into_iter()
            .map(|e| e.record.domain)
            .collect();
        assert_eq!(domains, vec!["c.com", "b.com", "a.com"]);
    }

    #[tokio::test]
    async fn test_empty_cache() {
        let cache = ResultCache::default();
        assert!(cache.is_empty().await);
        assert!(cache.get("example.com").await.is_none());
        assert!(cache.entries().await.is_empty());
    }
}
