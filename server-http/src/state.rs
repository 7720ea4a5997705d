use catalog::planes::data::SharedCache;
use catalog::{CatalogAccessor, CatalogOperations, CatalogValue, LocalCatalogStore, RemoteCatalogClient};
use shared::config::Config;
use std::sync::Arc;
use storage_engine::MokaCache;
use tracing::info;

pub type ProductCache = MokaCache<String, CatalogValue>;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogOperations>,
    pub cache: Arc<ProductCache>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogOperations>, cache: Arc<ProductCache>) -> Self {
        Self { catalog, cache }
    }

    /// Wire the cache, both backends and the accessor from configuration
    pub fn from_config(config: &Config) -> shared::Result<Self> {
        let cache = Arc::new(MokaCache::new(
            "catalog".to_string(),
            config.cache_max_entries,
        ));

        let remote = Arc::new(RemoteCatalogClient::new(&config.remote_base_url)?);
        info!("Remote catalog at {}", config.remote_base_url);

        let local = Arc::new(LocalCatalogStore::open(&config.database_path)?);
        info!("Local catalog at {}", config.database_path);

        let accessor = CatalogAccessor::new(cache.clone() as SharedCache, remote, local)
            .with_entry_ttl(config.cache_ttl);

        Ok(Self::new(Arc::new(accessor), cache))
    }

    pub fn cache_entries(&self) -> u64 {
        self.cache.entry_count()
    }
}
