//! JSON payload cache shared by the read-path facades.
//!
//! Domain values are serialized once on insert and the resulting bytes are
//! what handlers write to the wire, so a cached response is byte-identical
//! to an uncached one.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tracing::warn;

use super::stats::CacheStats;
use super::store::ExpiringStore;
use crate::error::Result;

/// Shortest TTL a facade accepts. A zero TTL is the store's never-expire
/// marker and must not reach it from an expiring facade.
pub const MIN_TTL: Duration = Duration::from_secs(1);

// == JSON Cache ==
/// An [`ExpiringStore`] of serialized JSON payloads with one fixed TTL.
#[derive(Debug)]
pub struct JsonCache<K> {
    store: Arc<ExpiringStore<K, Bytes>>,
    ttl: Duration,
}

impl<K> Clone for JsonCache<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ttl: self.ttl,
        }
    }
}

impl<K> JsonCache<K>
where
    K: Eq + Hash,
{
    // == Constructor ==
    /// Creates an empty cache whose entries expire `ttl` after insertion.
    ///
    /// A zero `ttl` is raised to [`MIN_TTL`].
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        let ttl = if ttl.is_zero() {
            warn!(store = name, "Zero TTL raised to the minimum");
            MIN_TTL
        } else {
            ttl
        };
        Self {
            store: Arc::new(ExpiringStore::new(name)),
            ttl,
        }
    }

    // == Insert ==
    /// Serializes `value`, stores it under `key` and returns the payload.
    ///
    /// If serialization fails nothing is cached and the error is returned,
    /// so the caller never serves or stores a truncated payload.
    pub fn insert<T>(&self, key: K, value: &T) -> Result<Bytes>
    where
        T: Serialize + ?Sized,
    {
        let payload = match serde_json::to_vec(value) {
            Ok(json) => Bytes::from(json),
            Err(err) => {
                warn!(store = self.store.name(), error = %err, "Refusing to cache unserializable value");
                return Err(err.into());
            }
        };
        self.store.set(key, payload.clone(), Some(self.ttl));
        Ok(payload)
    }

    // == Get ==
    /// Returns the cached payload for `key`, if any.
    pub fn get<Q>(&self, key: &Q) -> Option<Bytes>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.get(key)
    }

    // == Flush ==
    pub fn flush(&self) {
        self.store.flush();
    }

    /// The underlying store, for wiring up its sweeper.
    pub fn store(&self) -> Arc<ExpiringStore<K, Bytes>> {
        Arc::clone(&self.store)
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }
}
