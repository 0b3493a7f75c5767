use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::anyhow;
use folio_cache_contracts::{CacheService, Counter};
use tokio::time::Instant;

/// Minimum number of keys before expired counters are dropped on write.
const PRUNE_THRESHOLD: usize = 1024;

/// Process local cache, suitable for a single server instance.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    counters: Arc<Mutex<Counters>>,
}

#[derive(Debug, Default)]
struct Counters {
    entries: HashMap<String, Entry>,
    /// Size at which the next prune runs. Doubles the number of keys that
    /// survived the last prune, so pruning stays amortized constant per write.
    prune_at: usize,
}

impl Counters {
    fn prune_if_grown(&mut self, now: Instant) {
        if self.entries.len() < self.prune_at.max(PRUNE_THRESHOLD) {
            return;
        }
        self.entries.retain(|_, entry| entry.expires_at > now);
        self.prune_at = self.entries.len() * 2;
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: u64,
    expires_at: Instant,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.counters
            .lock()
            .map(|c| c.entries.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheService for MemoryCache {
    #[tracing::instrument(level = "trace", skip(self))]
    async fn increment(&self, key: &str, ttl: Duration) -> anyhow::Result<Counter> {
        let now = Instant::now();
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| anyhow!("Memory cache lock is poisoned"))?;

        counters.prune_if_grown(now);

        let fresh = Entry {
            value: 0,
            expires_at: now + ttl,
        };
        let entry = counters
            .entries
            .entry(key.to_owned())
            .and_modify(|entry| {
                if entry.expires_at <= now {
                    *entry = fresh;
                }
            })
            .or_insert(fresh);
        entry.value += 1;

        Ok(Counter {
            value: entry.value,
            expires_in: entry.expires_at - now,
        })
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
