pub mod classify;
pub mod domain;
pub mod keys;
pub mod persistence;
pub mod planes;
pub mod ports;
pub mod remote;

pub use domain::{Backend, CatalogQuery, CatalogValue, PriceRange, Product, QueryDescriptor, RawQuery};
pub use persistence::LocalCatalogStore;
pub use planes::data::{CatalogAccessor, CatalogOperations};
pub use remote::RemoteCatalogClient;
