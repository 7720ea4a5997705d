//! Canonical cache keys for query descriptors.
//!
//! Layout is `<backend-prefix><kind>[-<params>]`. Remote keys carry no prefix,
//! local-store keys are prefixed with `Db-`, so the two data sets never share
//! an entry. Free-text parameters are escaped so that a `-` inside a category
//! or search term cannot be confused with a parameter separator.

use crate::domain::{Backend, CatalogQuery, PriceRange, QueryDescriptor};

const LOCAL_PREFIX: &str = "Db-";

/// Builds the cache key for a descriptor. Pure and deterministic.
pub fn cache_key(descriptor: &QueryDescriptor) -> String {
    let prefix = match descriptor.backend {
        Backend::Remote => "",
        Backend::Local => LOCAL_PREFIX,
    };

    let body = match &descriptor.query {
        CatalogQuery::AllProducts => "all".to_string(),
        CatalogQuery::ById(id) => format!("id-{}", id),
        CatalogQuery::ByCategory(category) => format!("category-{}", escape(category)),
        CatalogQuery::ByCategoryAndPriceRange { category, range } => {
            format!("cat-{}-{}", escape(category), price_params(range))
        }
        CatalogQuery::ByPriceRange(range) => format!("price-{}", price_params(range)),
        CatalogQuery::BySearchTerm(term) => format!("search-{}", escape(term)),
    };

    format!("{}{}", prefix, body)
}

impl QueryDescriptor {
    pub fn cache_key(&self) -> String {
        cache_key(self)
    }
}

fn price_params(range: &PriceRange) -> String {
    // f64 Display is the shortest round-trip form, so distinct finite bounds
    // always render differently. -0 and 0 are the same bound.
    format!("{}-{}", canonical(range.min()), canonical(range.max()))
}

fn canonical(bound: f64) -> f64 {
    if bound == 0.0 { 0.0 } else { bound }
}

fn escape(param: &str) -> String {
    let mut out = String::with_capacity(param.len());
    for c in param.chars() {
        match c {
            '%' => out.push_str("%25"),
            '-' => out.push_str("%2D"),
            _ => out.push(c),
        }
    }
    out
}
