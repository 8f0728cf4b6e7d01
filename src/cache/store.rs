//! Cache Store Module
//!
//! Generic expiring key-value store. Expiry is sweep-driven: `get` returns
//! whatever is in the map, and only `sweep` removes expired entries.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;
use std::time::Duration;

use tokio::time::Instant;

use super::entry::CacheEntry;
use super::lock::{rw_read, rw_write};
use super::stats::{CacheStats, StatsCounters};

// == Sweep Trait ==
/// A store that can drop its expired entries. Implemented by every
/// [`ExpiringStore`] so one sweeper task works for any key/value types.
pub trait Sweep: Send + Sync {
    /// Store name used in logs.
    fn name(&self) -> &'static str;

    /// Removes expired entries, returning how many were removed.
    fn sweep(&self) -> usize;
}

// == Expiring Store ==
/// Thread-safe map from key to value with optional per-entry expiry.
///
/// `get` takes the shared lock; every mutation takes the exclusive lock.
#[derive(Debug)]
pub struct ExpiringStore<K, V> {
    name: &'static str,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    stats: StatsCounters,
}

impl<K, V> ExpiringStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty store. `name` only shows up in logs and stats.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
            stats: StatsCounters::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    // == Set ==
    /// Inserts or overwrites `key`.
    ///
    /// `ttl` of `None` or zero stores the entry without expiry.
    pub fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        let entry = CacheEntry::new(value, ttl);
        rw_write(&self.entries, self.name, "set").insert(key, entry);
    }

    // == Get ==
    /// Returns the stored value, including entries that are past their
    /// expiry but have not been swept yet.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = rw_read(&self.entries, self.name, "get")
            .get(key)
            .map(|entry| entry.value.clone());
        self.stats.record_lookup(value.is_some());
        value
    }

    // == Remove ==
    /// Drops a single key. Returns whether it was present.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        rw_write(&self.entries, self.name, "remove")
            .remove(key)
            .is_some()
    }

    // == Flush ==
    /// Empties the store.
    pub fn flush(&self) {
        rw_write(&self.entries, self.name, "flush").clear();
        self.stats.record_flush();
    }

    // == Replace All ==
    /// Swaps the whole content for `entries` in one exclusive section.
    ///
    /// The new map is built before the lock is taken, so readers see either
    /// the previous content or the new content, never an empty store in
    /// between. Returns the new entry count.
    pub fn replace_all<I>(&self, entries: I, ttl: Option<Duration>) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let now = Instant::now();
        let fresh: HashMap<K, CacheEntry<V>> = entries
            .into_iter()
            .map(|(key, value)| (key, CacheEntry::new_at(value, ttl, now)))
            .collect();
        let count = fresh.len();

        *rw_write(&self.entries, self.name, "replace_all") = fresh;
        count
    }

    // == Sweep ==
    /// Removes every entry that had expired at `now`.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let removed = {
            let mut entries = rw_write(&self.entries, self.name, "sweep");
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired_at(now));
            before - entries.len()
        };
        self.stats.record_swept(removed);
        removed
    }

    // == Length ==
    /// Returns the current number of entries, expired-but-unswept included.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, self.name, "len").len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }
}

impl<K, V> Sweep for ExpiringStore<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }
}
