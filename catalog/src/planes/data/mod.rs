pub mod catalog_access;
pub mod operation;
pub mod stats;

pub use catalog_access::{CatalogAccessor, CatalogView, SharedCache, DEFAULT_ENTRY_TTL};
pub use operation::CatalogOperations;
pub use stats::{AccessStats, AccessStatsSnapshot};
