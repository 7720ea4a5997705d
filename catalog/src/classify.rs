//! Maps raw caller input and backend results onto the failure taxonomy.
//!
//! Validation happens strictly before I/O. Everything after a backend call
//! resolves to `Ok`, `NotFound` or `Transient`.

use crate::domain::{CatalogQuery, PriceRange, RawQuery};
use shared::{Error, Result};
use std::fmt::Display;

/// Parses raw routing parameters into a typed query.
pub fn validate(raw: RawQuery) -> Result<CatalogQuery> {
    match raw {
        RawQuery::AllProducts => Ok(CatalogQuery::AllProducts),
        RawQuery::ById { id } => parse_id(&id).map(CatalogQuery::ById),
        RawQuery::ByCategory { category } => {
            require_text("category", &category)?;
            Ok(CatalogQuery::ByCategory(category))
        }
        RawQuery::ByCategoryAndPriceRange {
            category,
            min_price,
            max_price,
        } => {
            let range = parse_price_range(&min_price, &max_price)?;
            require_text("category", &category)?;
            Ok(CatalogQuery::ByCategoryAndPriceRange { category, range })
        }
        RawQuery::ByPriceRange {
            min_price,
            max_price,
        } => parse_price_range(&min_price, &max_price).map(CatalogQuery::ByPriceRange),
        RawQuery::BySearchTerm { term } => {
            require_text("name", &term)?;
            Ok(CatalogQuery::BySearchTerm(term))
        }
    }
}

/// Checks typed parameters that cannot be ruled out by the type system.
pub fn validate_query(query: &CatalogQuery) -> Result<()> {
    match query {
        CatalogQuery::ByCategory(category)
        | CatalogQuery::ByCategoryAndPriceRange { category, .. } => {
            require_text("category", category)
        }
        CatalogQuery::BySearchTerm(term) => require_text("name", term),
        CatalogQuery::AllProducts | CatalogQuery::ById(_) | CatalogQuery::ByPriceRange(_) => {
            Ok(())
        }
    }
}

pub fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::Validation(format!("Invalid product ID format: '{}'.", raw)))
}

pub fn parse_price_range(min_raw: &str, max_raw: &str) -> Result<PriceRange> {
    let invalid = || {
        Error::Validation(format!(
            "Invalid product Price range format: '{}-{}'.",
            min_raw, max_raw
        ))
    };

    let min = parse_price(min_raw).ok_or_else(invalid)?;
    let max = parse_price(max_raw).ok_or_else(invalid)?;
    PriceRange::new(min, max)
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|price| price.is_finite())
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!(
            "Missing required parameter '{}'.",
            field
        )));
    }
    Ok(())
}

/// Classifies a remote HTTP status. `subject` describes what was requested.
pub fn classify_status(status: u16, subject: impl FnOnce() -> String) -> Result<()> {
    match status {
        200..=299 => Ok(()),
        404 => Err(Error::NotFound(format!("{} not found", subject()))),
        other => Err(Error::Transient(format!(
            "remote catalog responded with status {} for {}",
            other,
            subject()
        ))),
    }
}

/// An empty collection is reported exactly like a missing resource.
pub fn require_matches<T>(items: Vec<T>, subject: impl FnOnce() -> String) -> Result<Vec<T>> {
    if items.is_empty() {
        return Err(Error::NotFound(format!("No products found for {}", subject())));
    }
    Ok(items)
}

pub fn transient(context: &str, err: impl Display) -> Error {
    Error::Transient(format!("{}: {}", context, err))
}

/// Human-readable description of a query for error details and logs.
pub fn describe(query: &CatalogQuery) -> String {
    match query {
        CatalogQuery::AllProducts => "all products".to_string(),
        CatalogQuery::ById(id) => format!("Product with ID {}", id),
        CatalogQuery::ByCategory(category) => format!("category '{}'", category),
        CatalogQuery::ByCategoryAndPriceRange { category, range } => format!(
            "category '{}' priced {}-{}",
            category,
            range.min(),
            range.max()
        ),
        CatalogQuery::ByPriceRange(range) => format!("price range {}-{}", range.min(), range.max()),
        CatalogQuery::BySearchTerm(term) => format!("search term '{}'", term),
    }
}
