use crate::core::token::Token;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default lifetime of a cached token list.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Storage key of the cached token list.
pub const TOKEN_LIST_KEY: &str = "solanaTokenData";

/// A byte-oriented key-value collection.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;
    async fn put(&self, key: &[u8], value: &[u8]);
}

/// Hands out named collections, either in memory or on disk.
pub trait Store: Send + Sync {
    fn get_collection(&self, name: &str, persist: bool) -> Arc<dyn KeyValueCollection>;
}

/// A token list together with the time it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Vec<Token>,
    /// Unix time in milliseconds.
    pub timestamp: i64,
}

/// Time-boxed cache of the most recent token list, stored under a single key.
#[derive(Clone)]
pub struct TokenCache {
    collection: Arc<dyn KeyValueCollection>,
    key: String,
    ttl: Duration,
}

impl TokenCache {
    pub fn new(collection: Arc<dyn KeyValueCollection>, ttl: Duration) -> Self {
        Self {
            collection,
            key: TOKEN_LIST_KEY.to_string(),
            ttl,
        }
    }

    /// Returns the stored entry only while it is younger than the TTL.
    pub async fn get(&self) -> Option<CacheEntry> {
        let entry = self.peek().await?;
        let age_ms = Utc::now().timestamp_millis() - entry.timestamp;
        if age_ms < self.ttl.as_millis() as i64 {
            debug!("Cache HIT for key: {} (age {}ms)", self.key, age_ms);
            Some(entry)
        } else {
            debug!("Cache entry expired for key: {} (age {}ms)", self.key, age_ms);
            None
        }
    }

    /// Returns the stored entry regardless of its age.
    pub async fn peek(&self) -> Option<CacheEntry> {
        let Some(raw) = self.collection.get(self.key.as_bytes()).await else {
            debug!("Cache MISS for key: {}", self.key);
            return None;
        };

        match serde_json::from_slice::<CacheEntry>(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Ignoring malformed cache entry for key {}: {}", self.key, e);
                None
            }
        }
    }

    /// Overwrites the stored entry with `tokens` stamped at the current time.
    pub async fn put(&self, tokens: &[Token]) {
        let entry = CacheEntry {
            data: tokens.to_vec(),
            timestamp: Utc::now().timestamp_millis(),
        };
        match serde_json::to_vec(&entry) {
            Ok(bytes) => {
                self.collection.put(self.key.as_bytes(), &bytes).await;
                debug!("Cache PUT for key: {} ({} tokens)", self.key, tokens.len());
            }
            Err(e) => warn!("Failed to serialize token list for cache: {}", e),
        }
    }

    /// Stores `entry` keeping its original timestamp.
    pub async fn put_entry(&self, entry: &CacheEntry) {
        match serde_json::to_vec(entry) {
            Ok(bytes) => self.collection.put(self.key.as_bytes(), &bytes).await,
            Err(e) => warn!("Failed to serialize cache entry: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryCollection;
    use tokio::time::sleep;

    fn token(symbol: &str) -> Token {
        serde_json::from_value(serde_json::json!({
            "address": format!("{symbol}-address"),
            "symbol": symbol,
            "name": format!("{symbol} token"),
            "v24hUSD": 1000.0,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = TokenCache::new(Arc::new(MemoryCollection::new()), DEFAULT_TTL);

        // Initially, cache is empty
        assert!(cache.get().await.is_none());

        let tokens = vec![token("BONK"), token("JUP")];
        cache.put(&tokens).await;

        let entry = cache.get().await.unwrap();
        assert_eq!(entry.data, tokens);
        assert!(Utc::now().timestamp_millis() - entry.timestamp < 5_000);
    }

    #[tokio::test]
    async fn test_get_after_ttl_expiration() {
        let collection = Arc::new(MemoryCollection::new());
        let cache = TokenCache::new(collection, Duration::from_millis(10));

        cache.put(&[token("WIF")]).await;
        assert!(cache.get().await.is_some());

        // Wait for TTL expiration
        sleep(Duration::from_millis(20)).await;
        assert!(cache.get().await.is_none());

        // Expired data is still available to peek
        let entry = cache.peek().await.unwrap();
        assert_eq!(entry.data[0].symbol, "WIF");
    }

    #[tokio::test]
    async fn test_malformed_entry_is_absent() {
        let collection = Arc::new(MemoryCollection::new());
        collection
            .put(TOKEN_LIST_KEY.as_bytes(), b"{\"data\": 42}")
            .await;
        let cache = TokenCache::new(collection, DEFAULT_TTL);

        assert!(cache.get().await.is_none());
        assert!(cache.peek().await.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache = TokenCache::new(Arc::new(MemoryCollection::new()), DEFAULT_TTL);

        cache.put(&[token("A"), token("B")]).await;
        cache.put(&[token("C")]).await;
        let entry = cache.get().await.unwrap();
        assert_eq!(entry.data.len(), 1);
        assert_eq!(entry.data[0].symbol, "C");
    }

    #[tokio::test]
    async fn test_entry_from_the_past_is_expired() {
        let cache = TokenCache::new(Arc::new(MemoryCollection::new()), DEFAULT_TTL);
        let stale = CacheEntry {
            data: vec![token("OLD")],
            timestamp: Utc::now().timestamp_millis() - 6 * 60 * 1000,
        };
        cache.put_entry(&stale).await;

        assert!(cache.get().await.is_none());
        assert_eq!(cache.peek().await, Some(stale));
    }
}
