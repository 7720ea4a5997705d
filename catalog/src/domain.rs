use serde::{Deserialize, Serialize};
use shared::{Error, Result};

/// Longest description a returned product may carry, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Truncates the description to its first [`MAX_DESCRIPTION_CHARS`] characters.
    pub fn truncate_description(&mut self) {
        if let Some((byte_idx, _)) = self.description.char_indices().nth(MAX_DESCRIPTION_CHARS) {
            self.description.truncate(byte_idx);
        }
    }
}

/// Payload held in the cache and handed back to callers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CatalogValue {
    Product(Product),
    Products(Vec<Product>),
}

impl CatalogValue {
    /// Applies display normalization to every product in the value.
    pub fn normalized(mut self) -> Self {
        match &mut self {
            CatalogValue::Product(product) => product.truncate_description(),
            CatalogValue::Products(products) => {
                products.iter_mut().for_each(Product::truncate_description)
            }
        }
        self
    }

    pub fn into_product(self) -> Result<Product> {
        match self {
            CatalogValue::Product(product) => Ok(product),
            CatalogValue::Products(_) => Err(Error::Transient(
                "backend returned a collection for a single-product lookup".to_string(),
            )),
        }
    }

    pub fn into_products(self) -> Result<Vec<Product>> {
        match self {
            CatalogValue::Products(products) => Ok(products),
            CatalogValue::Product(_) => Err(Error::Transient(
                "backend returned a single product for a collection lookup".to_string(),
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    Remote,
    Local,
}

/// Inclusive price bounds. Both ends are always finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceRange {
    min: f64,
    max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::Validation(format!(
                "Invalid product Price range format: '{}-{}'.",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CatalogQuery {
    AllProducts,
    ById(i64),
    ByCategory(String),
    ByCategoryAndPriceRange { category: String, range: PriceRange },
    ByPriceRange(PriceRange),
    BySearchTerm(String),
}

impl CatalogQuery {
    /// Whether the query resolves to one product rather than a collection.
    pub fn is_single(&self) -> bool {
        matches!(self, CatalogQuery::ById(_))
    }
}

/// One catalog lookup bound to the backend that must answer it.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryDescriptor {
    pub backend: Backend,
    pub query: CatalogQuery,
}

impl QueryDescriptor {
    pub fn new(backend: Backend, query: CatalogQuery) -> Self {
        Self { backend, query }
    }

    pub fn remote(query: CatalogQuery) -> Self {
        Self::new(Backend::Remote, query)
    }

    pub fn local(query: CatalogQuery) -> Self {
        Self::new(Backend::Local, query)
    }
}

/// Query parameters exactly as a routing layer received them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawQuery {
    AllProducts,
    ById {
        id: String,
    },
    ByCategory {
        category: String,
    },
    ByCategoryAndPriceRange {
        category: String,
        min_price: String,
        max_price: String,
    },
    ByPriceRange {
        min_price: String,
        max_price: String,
    },
    BySearchTerm {
        term: String,
    },
}
