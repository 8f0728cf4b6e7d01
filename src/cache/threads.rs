//! Thread Caches Module
//!
//! Short-lived caches for the trending list, board pages and single
//! threads. Thread data changes constantly, so these TTLs are seconds to
//! minutes.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use super::facade::JsonCache;
use super::stats::CacheStats;
use super::store::ExpiringStore;
use crate::error::Result;
use crate::models::{ThreadWithOp, ThreadWithPosts, TrendingThread};

const TRENDING_KEY: &str = "trending";

// == Trending ==
/// Caches the site-wide trending thread list under a single key.
#[derive(Debug, Clone)]
pub struct TrendingThreadsCache {
    inner: JsonCache<&'static str>,
}

impl TrendingThreadsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: JsonCache::new("trending", ttl),
        }
    }

    /// Serializes and caches the trending list, returning the payload.
    pub fn insert_threads(&self, threads: &[TrendingThread]) -> Result<Bytes> {
        self.inner.insert(TRENDING_KEY, threads)
    }

    /// Returns the cached trending payload, if present.
    pub fn get_threads(&self) -> Option<Bytes> {
        self.inner.get(&TRENDING_KEY)
    }

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

// == Board Pages ==
/// Identifies one page of one board.
///
/// Kept as a struct so no board URI can alias another board's page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub board_uri: String,
    pub page: u32,
}

impl PageKey {
    pub fn new(board_uri: impl Into<String>, page: u32) -> Self {
        Self {
            board_uri: board_uri.into(),
            page,
        }
    }
}

/// Caches thread summary pages, one entry per board and page number.
#[derive(Debug, Clone)]
pub struct ThreadsPageCache {
    inner: JsonCache<PageKey>,
}

impl ThreadsPageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: JsonCache::new("threads_page", ttl),
        }
    }

    /// Serializes and caches one page of `board_uri`, returning the payload.
    pub fn insert_page(&self, board_uri: &str, page: u32, threads: &[ThreadWithOp]) -> Result<Bytes> {
        self.inner.insert(PageKey::new(board_uri, page), threads)
    }

    /// Returns the cached payload for that board and page, if present.
    pub fn get_page(&self, board_uri: &str, page: u32) -> Option<Bytes> {
        self.inner.get(&PageKey::new(board_uri, page))
    }

    pub fn flush(&self) {
        self.inner.flush();
    }

    /// The underlying store, for wiring up its sweeper.
    pub fn store(&self) -> Arc<ExpiringStore<PageKey, Bytes>> {
        self.inner.store()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

// == Single Thread ==
/// Caches full threads with their posts, keyed by thread id.
#[derive(Debug, Clone)]
pub struct ThreadCache {
    inner: JsonCache<i64>,
}

impl ThreadCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: JsonCache::new("thread", ttl),
        }
    }

    /// Serializes and caches one thread with its posts.
    pub fn insert_thread(&self, thread_id: i64, thread: &ThreadWithPosts) -> Result<Bytes> {
        self.inner.insert(thread_id, thread)
    }

    /// Returns the cached thread payload, if present.
    pub fn get_thread(&self, thread_id: i64) -> Option<Bytes> {
        self.inner.get(&thread_id)
    }

    pub fn flush(&self) {
        self.inner.flush();
    }

    /// The underlying store, for wiring up its sweeper.
    pub fn store(&self) -> Arc<ExpiringStore<i64, Bytes>> {
        self.inner.store()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}
