use crate::api::ApiError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use catalog::{Backend, CatalogValue, RawQuery};
use serde::Deserialize;
use tracing::info;

type CatalogResponse = Result<Json<CatalogValue>, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct PriceParams {
    #[serde(rename = "minPrice", default)]
    pub min_price: String,
    #[serde(rename = "maxPrice", default)]
    pub max_price: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub name: String,
}

async fn respond(state: &AppState, backend: Backend, raw: RawQuery) -> CatalogResponse {
    info!("GET: backend={:?}, query={:?}", backend, raw);

    let value = state.catalog.execute_raw(backend, raw).await?;
    Ok(Json(value))
}

/// GET /products[/api]
pub async fn all_products(State(state): State<AppState>, backend: Backend) -> CatalogResponse {
    respond(&state, backend, RawQuery::AllProducts).await
}

/// GET /products[/api]/:id
pub async fn product_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    backend: Backend,
) -> CatalogResponse {
    respond(&state, backend, RawQuery::ById { id }).await
}

/// GET /products[/api]/category/:category
pub async fn products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    backend: Backend,
) -> CatalogResponse {
    respond(&state, backend, RawQuery::ByCategory { category }).await
}

/// GET /products[/api]/category/:category/price?minPrice=&maxPrice=
pub async fn products_by_category_and_price(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(params): Query<PriceParams>,
    backend: Backend,
) -> CatalogResponse {
    let raw = RawQuery::ByCategoryAndPriceRange {
        category,
        min_price: params.min_price,
        max_price: params.max_price,
    };
    respond(&state, backend, raw).await
}

/// GET /products[/api]/price?minPrice=&maxPrice=
pub async fn products_by_price(
    State(state): State<AppState>,
    Query(params): Query<PriceParams>,
    backend: Backend,
) -> CatalogResponse {
    let raw = RawQuery::ByPriceRange {
        min_price: params.min_price,
        max_price: params.max_price,
    };
    respond(&state, backend, raw).await
}

/// GET /products[/api]/search?name=
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
    backend: Backend,
) -> CatalogResponse {
    respond(&state, backend, RawQuery::BySearchTerm { term: params.name }).await
}
