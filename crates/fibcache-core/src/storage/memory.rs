//! In-memory store using DashMap

use crate::error::{StoreError, StoreResult};
use crate::ports::KvStore;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// In-memory store with optional per-entry TTL
pub struct MemoryStore {
    data: Arc<DashMap<String, CacheEntry>>,
    ttl: Option<Duration>,
}

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|expires| now > expires).unwrap_or(false)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_ttl(None)
    }

    /// Entries added from now on expire `ttl` after insertion.
    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            data: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Periodically drop expired entries. Stops once the store is dropped.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let data: Weak<DashMap<String, CacheEntry>> = Arc::downgrade(&self.data);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;

                let Some(data) = data.upgrade() else {
                    break;
                };
                let now = Instant::now();
                let before = data.len();
                data.retain(|_, entry| !entry.is_expired(now));
                let swept = before.saturating_sub(data.len());
                if swept > 0 {
                    debug!(swept, "Swept expired session entries");
                }
            }
        })
    }

    fn new_entry(&self, value: &[u8]) -> CacheEntry {
        CacheEntry {
            value: value.to_vec(),
            expires_at: self.ttl.map(|ttl| Instant::now() + ttl),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn add(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        match self.data.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().is_expired(Instant::now()) {
                    return Err(StoreError::AlreadyExists(key.to_string()));
                }
                occupied.insert(self.new_entry(value));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(self.new_entry(value));
            }
        }
        Ok(())
    }

    async fn fetch(&self, key: &str) -> StoreResult<Vec<u8>> {
        let now = Instant::now();
        let value = self.data.get(key).and_then(|entry| {
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.value.clone())
            }
        });
        match value {
            Some(value) => Ok(value),
            None => {
                self.data.remove_if(key, |_, entry| entry.is_expired(now));
                Err(StoreError::NotFound(key.to_string()))
            }
        }
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        match self.data.remove(key) {
            Some((_, entry)) if !entry.is_expired(Instant::now()) => Ok(()),
            _ => Err(StoreError::NotFound(key.to_string())),
        }
    }
}
