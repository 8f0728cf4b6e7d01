//! Ban Cache Module
//!
//! Ban list consulted by the request gate. Entries never expire on their
//! own; the whole list is reloaded from the repository on every refresh.

use std::sync::{Arc, Mutex};

use tracing::info;

use super::lock::mutex_lock;
use super::stats::CacheStats;
use super::store::ExpiringStore;
use crate::error::Result;
use crate::models::canonical_ip;
use crate::repository::Repository;

/// Canonical address when `raw` parses, otherwise the trimmed input.
fn ban_key(raw: &str) -> String {
    canonical_ip(raw).unwrap_or_else(|| raw.trim().to_string())
}

// == Ban Cache ==
/// IP address → ban reason.
///
/// Addresses are stored in canonical form so they match what the gate
/// derives from the peer address.
#[derive(Clone)]
pub struct BanCache {
    store: Arc<ExpiringStore<String, String>>,
    repo: Arc<dyn Repository>,
    /// Bans inserted since the running refresh started its fetch
    journal: Arc<Mutex<Vec<(String, String)>>>,
    /// Serializes refreshes so one journal covers one fetch
    refreshing: Arc<tokio::sync::Mutex<()>>,
}

impl std::fmt::Debug for BanCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BanCache")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl BanCache {
    // == Constructor ==
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            store: Arc::new(ExpiringStore::new("bans")),
            repo,
            journal: Arc::new(Mutex::new(Vec::new())),
            refreshing: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    // == Insert / Lookup ==
    /// Stores a ban until the next refresh or flush.
    ///
    /// A refresh already fetching from the repository keeps this ban when
    /// it swaps in the fetched list.
    pub fn insert_ban(&self, ip: impl AsRef<str>, reason: impl Into<String>) {
        let ip = ban_key(ip.as_ref());
        let reason = reason.into();
        let mut journal = mutex_lock(&self.journal, "bans", "insert_ban");
        self.store.set(ip.clone(), reason.clone(), None);
        journal.push((ip, reason));
    }

    /// Returns the ban reason if `ip` is banned.
    pub fn is_banned(&self, ip: &str) -> Option<String> {
        self.store.get(&ban_key(ip))
    }

    // == Refresh ==
    /// Reloads the full ban list from the repository.
    ///
    /// The fetch completes before the store is touched. On failure the
    /// current ban list stays exactly as it was and the error is returned.
    /// On success the content is swapped in one step, so lookups never see
    /// a partially loaded list. Bans inserted while the fetch was running
    /// are carried over into the new list.
    pub async fn refresh(&self) -> Result<usize> {
        let _running = self.refreshing.lock().await;
        mutex_lock(&self.journal, "bans", "refresh").clear();

        let bans = self.repo.list_bans().await?;

        let count = {
            let mut journal = mutex_lock(&self.journal, "bans", "refresh");
            let fetched = bans
                .into_iter()
                .map(|ban| (ban_key(&ban.ip), ban.reason));
            self.store.replace_all(fetched.chain(journal.drain(..)), None)
        };
        info!(bans = count, "Ban list refreshed");
        Ok(count)
    }

    // == Flush ==
    pub fn flush(&self) {
        self.store.flush();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }
}
