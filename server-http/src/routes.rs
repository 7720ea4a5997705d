use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderValue, Method},
    routing::get,
};
use catalog::Backend;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const REMOTE_PREFIX: &str = "/products/api";
const LOCAL_PREFIX: &str = "/products";

/// Router wrapped so trailing slashes are trimmed before route matching
pub type App = NormalizePath<Router>;

/// Build and configure the application router
pub fn build_router(state: AppState, allowed_origins: &[String]) -> App {
    let router = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Catalog routes, one family per backend
        .merge(catalog_routes(REMOTE_PREFIX, Backend::Remote))
        .merge(catalog_routes(LOCAL_PREFIX, Backend::Local))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(allowed_origins))
        .with_state(state);

    // Router::layer runs after matching, so path rewriting has to wrap the router
    NormalizePath::trim_trailing_slash(router)
}

fn catalog_routes(prefix: &str, backend: Backend) -> Router<AppState> {
    Router::new()
        .route(
            prefix,
            get(move |state: State<AppState>| handlers::all_products(state, backend)),
        )
        .route(
            &format!("{prefix}/{{id}}"),
            get(move |state: State<AppState>, id: Path<String>| {
                handlers::product_by_id(state, id, backend)
            }),
        )
        .route(
            &format!("{prefix}/category/{{category}}"),
            get(move |state: State<AppState>, category: Path<String>| {
                handlers::products_by_category(state, category, backend)
            }),
        )
        .route(
            &format!("{prefix}/category/{{category}}/price"),
            get(
                move |state: State<AppState>,
                      category: Path<String>,
                      params: Query<handlers::products::PriceParams>| {
                    handlers::products_by_category_and_price(state, category, params, backend)
                },
            ),
        )
        .route(
            &format!("{prefix}/price"),
            get(
                move |state: State<AppState>, params: Query<handlers::products::PriceParams>| {
                    handlers::products_by_price(state, params, backend)
                },
            ),
        )
        .route(
            &format!("{prefix}/search"),
            get(
                move |state: State<AppState>, params: Query<handlers::products::SearchParams>| {
                    handlers::search_products(state, params, backend)
                },
            ),
        )
}

/// A "*" entry, or no entries at all, allows every origin
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods([Method::GET, Method::OPTIONS]);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        info!("CORS: allowing all origins");
        return cors.allow_origin(Any).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    info!("CORS: allowing origins {:?}", allowed_origins);
    cors.allow_origin(AllowOrigin::list(origins)).allow_headers(Any)
}
