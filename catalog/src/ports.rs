#![deny(clippy::all)]

use crate::domain::{CatalogQuery, CatalogValue};
use async_trait::async_trait;
use shared::Result;
use std::time::Duration;

// Ports are the pluggable extension points for caches and authoritative data sources

/// Port for the shared key/value cache (e.g., Moka)
///
/// Implementations must be safe for concurrent callers. A successful `get`
/// restarts the entry's TTL clock; entries idle for longer than their TTL
/// behave as absent.
#[async_trait]
pub trait CacheStore<K, V>: Send + Sync + 'static {
    /// Look up a live entry, sliding its expiry forward on a hit.
    async fn get(&self, key: &K) -> Option<V>;

    /// Insert or replace an entry that lives for `ttl` since its last access.
    async fn put(&self, key: K, val: V, ttl: Duration);
}

/// Port for an authoritative catalog backend (remote service or local store)
///
/// A backend answers with `Ok`, `NotFound` or `Transient`; it never reports
/// validation failures.
#[async_trait]
pub trait CatalogBackend: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn fetch(&self, query: &CatalogQuery) -> Result<CatalogValue>;
}
