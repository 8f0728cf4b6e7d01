//! Board List Cache Module
//!
//! The full board list under a single key, invalidated whenever a board is
//! created.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use super::facade::JsonCache;
use super::stats::CacheStats;
use super::store::ExpiringStore;
use crate::error::Result;
use crate::models::Board;

const BOARDS_KEY: &str = "boards";

// == Boards Cache ==
/// Caches the full board list under a single key. Flushed whenever a board
/// is created.
#[derive(Debug, Clone)]
pub struct BoardsCache {
    inner: JsonCache<&'static str>,
}

impl BoardsCache {
    // == Constructor ==
    /// Creates an empty board list cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: JsonCache::new("boards", ttl),
        }
    }

    // == Insert / Get ==
    /// Serializes and caches the board list, returning the payload.
    pub fn insert_boards(&self, boards: &[Board]) -> Result<Bytes> {
        self.inner.insert(BOARDS_KEY, boards)
    }

    /// Returns the cached board list payload, if present.
    pub fn get_boards(&self) -> Option<Bytes> {
        self.inner.get(&BOARDS_KEY)
    }

    // == Flush ==
    /// Drops the cached list so the next read goes to the repository.
    pub fn flush(&self) {
        self.inner.flush();
    }

    /// The underlying store, for wiring up its sweeper.
    pub fn store(&self) -> Arc<ExpiringStore<&'static str, Bytes>> {
        self.inner.store()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}
