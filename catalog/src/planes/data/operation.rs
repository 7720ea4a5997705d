use crate::domain::{Backend, CatalogValue, QueryDescriptor, RawQuery};
use crate::planes::data::stats::AccessStatsSnapshot;
use async_trait::async_trait;
use shared::Result;

/// Application-level catalog operations trait
/// This is the seam routing layers call into
#[async_trait]
pub trait CatalogOperations: Send + Sync + 'static {
    /// Run a typed lookup through the cache-aside flow.
    async fn execute(&self, descriptor: &QueryDescriptor) -> Result<CatalogValue>;

    /// Validate raw parameters, then run the lookup against `backend`.
    async fn execute_raw(&self, backend: Backend, raw: RawQuery) -> Result<CatalogValue>;

    fn stats(&self) -> AccessStatsSnapshot;
}
