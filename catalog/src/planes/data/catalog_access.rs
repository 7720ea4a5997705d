use crate::classify::{describe, validate, validate_query};
use crate::domain::{
    Backend, CatalogQuery, CatalogValue, PriceRange, Product, QueryDescriptor, RawQuery,
};
use crate::planes::data::operation::CatalogOperations;
use crate::planes::data::stats::{AccessStats, AccessStatsSnapshot};
use crate::ports::{CacheStore, CatalogBackend};
use async_trait::async_trait;
use shared::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Sliding lifetime of a cached lookup when none is configured.
pub const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(5 * 60);

/// Process-wide cache shared by every accessor handle.
pub type SharedCache = Arc<dyn CacheStore<String, CatalogValue>>;

/// Cache-aside orchestrator over the remote catalog and the local store
///
/// Flow per call: validate → compute key → check cache → on miss call the
/// backend once → normalize and cache successes only. `NotFound` and
/// `Transient` outcomes are returned without touching the cache, so an
/// upstream recovery is visible on the very next call.
///
/// Concurrent misses on the same key are not coalesced; both callers reach
/// the backend and the last write wins.
#[derive(Clone)]
pub struct CatalogAccessor {
    cache: SharedCache,
    remote: Arc<dyn CatalogBackend>,
    local: Arc<dyn CatalogBackend>,
    entry_ttl: Duration,
    stats: Arc<AccessStats>,
}

impl CatalogAccessor {
    pub fn new(
        cache: SharedCache,
        remote: Arc<dyn CatalogBackend>,
        local: Arc<dyn CatalogBackend>,
    ) -> Self {
        Self {
            cache,
            remote,
            local,
            entry_ttl: DEFAULT_ENTRY_TTL,
            stats: Arc::new(AccessStats::default()),
        }
    }

    pub fn with_entry_ttl(mut self, entry_ttl: Duration) -> Self {
        self.entry_ttl = entry_ttl;
        self
    }

    /// Typed lookups against the remote catalog service
    pub fn remote(&self) -> CatalogView<'_> {
        CatalogView {
            accessor: self,
            backend: Backend::Remote,
        }
    }

    /// Typed lookups against the local relational store
    pub fn local(&self) -> CatalogView<'_> {
        CatalogView {
            accessor: self,
            backend: Backend::Local,
        }
    }

    fn backend(&self, backend: Backend) -> &Arc<dyn CatalogBackend> {
        match backend {
            Backend::Remote => &self.remote,
            Backend::Local => &self.local,
        }
    }

    fn reject(&self, err: Error) -> Error {
        self.stats.record_error(&err);
        debug!("Rejected query before I/O: {}", err);
        err
    }

    async fn load(&self, key: String, descriptor: &QueryDescriptor) -> Result<CatalogValue> {
        let backend = self.backend(descriptor.backend);
        debug!("Cache miss for key '{}', querying {} backend", key, backend.name());

        match backend.fetch(&descriptor.query).await {
            Ok(value) => {
                let value = value.normalized();
                self.cache.put(key, value.clone(), self.entry_ttl).await;
                Ok(value)
            }
            Err(err) => {
                // validation is settled before I/O; a backend cannot report it
                let err = match err {
                    Error::Validation(detail) => Error::Transient(detail),
                    other => other,
                };
                self.stats.record_error(&err);
                if err.is_transient() {
                    warn!(
                        "{} backend failed for {}: {}",
                        backend.name(),
                        describe(&descriptor.query),
                        err
                    );
                } else {
                    debug!("{} backend has nothing for key '{}'", backend.name(), key);
                }
                Err(err)
            }
        }
    }
}

#[async_trait]
impl CatalogOperations for CatalogAccessor {
    async fn execute(&self, descriptor: &QueryDescriptor) -> Result<CatalogValue> {
        validate_query(&descriptor.query).map_err(|e| self.reject(e))?;

        let key = descriptor.cache_key();
        if let Some(value) = self.cache.get(&key).await {
            self.stats.record_hit();
            debug!("Cache hit for key '{}'", key);
            return Ok(value);
        }

        self.stats.record_miss();
        self.load(key, descriptor).await
    }

    async fn execute_raw(&self, backend: Backend, raw: RawQuery) -> Result<CatalogValue> {
        let query = validate(raw).map_err(|e| self.reject(e))?;
        self.execute(&QueryDescriptor::new(backend, query)).await
    }

    fn stats(&self) -> AccessStatsSnapshot {
        self.stats.snapshot()
    }
}

impl std::fmt::Debug for CatalogAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogAccessor")
            .field("remote", &self.remote.name())
            .field("local", &self.local.name())
            .field("entry_ttl", &self.entry_ttl)
            .finish()
    }
}

/// The six lookups bound to one backend
#[derive(Clone, Copy)]
pub struct CatalogView<'a> {
    accessor: &'a CatalogAccessor,
    backend: Backend,
}

impl CatalogView<'_> {
    async fn run(&self, query: CatalogQuery) -> Result<CatalogValue> {
        self.accessor
            .execute(&QueryDescriptor::new(self.backend, query))
            .await
    }

    fn range(&self, min_price: f64, max_price: f64) -> Result<PriceRange> {
        PriceRange::new(min_price, max_price).map_err(|e| self.accessor.reject(e))
    }

    pub async fn all_products(&self) -> Result<Vec<Product>> {
        self.run(CatalogQuery::AllProducts).await?.into_products()
    }

    pub async fn product_by_id(&self, id: i64) -> Result<Product> {
        self.run(CatalogQuery::ById(id)).await?.into_product()
    }

    pub async fn products_by_category(&self, category: &str) -> Result<Vec<Product>> {
        self.run(CatalogQuery::ByCategory(category.to_string()))
            .await?
            .into_products()
    }

    pub async fn products_by_category_and_price_range(
        &self,
        category: &str,
        min_price: f64,
        max_price: f64,
    ) -> Result<Vec<Product>> {
        let range = self.range(min_price, max_price)?;
        self.run(CatalogQuery::ByCategoryAndPriceRange {
            category: category.to_string(),
            range,
        })
        .await?
        .into_products()
    }

    pub async fn products_by_price_range(
        &self,
        min_price: f64,
        max_price: f64,
    ) -> Result<Vec<Product>> {
        let range = self.range(min_price, max_price)?;
        self.run(CatalogQuery::ByPriceRange(range))
            .await?
            .into_products()
    }

    pub async fn search_products(&self, term: &str) -> Result<Vec<Product>> {
        self.run(CatalogQuery::BySearchTerm(term.to_string()))
            .await?
            .into_products()
    }
}
