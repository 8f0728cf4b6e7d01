//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single cache entry with value and expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Absolute expiration instant, None = never expires
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry that expires `ttl` from now.
    ///
    /// `None` and a zero duration both mean the entry never expires.
    pub fn new(value: V, ttl: Option<Duration>) -> Self {
        Self::new_at(value, ttl, Instant::now())
    }

    /// Creates a new cache entry relative to an explicit `now`.
    pub fn new_at(value: V, ttl: Option<Duration>, now: Instant) -> Self {
        let expires_at = ttl.filter(|ttl| !ttl.is_zero()).map(|ttl| now + ttl);
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry had expired at `now`.
    ///
    /// An entry only counts as expired once `now` is strictly past its
    /// expiration instant. Never-expiring entries are never expired.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }
}
