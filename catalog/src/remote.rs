use crate::classify::{classify_status, describe, require_matches, transient};
use crate::domain::{CatalogQuery, CatalogValue, PriceRange, Product};
use crate::ports::CatalogBackend;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use shared::{Error, Result};
use tracing::debug;

/// List endpoints wrap their results in this envelope.
#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    products: Vec<Product>,
}

/// Client for the remote HTTP catalog (dummyjson-compatible).
///
/// Only category filtering happens server-side; price and title filters are
/// applied to the fetched collection.
#[derive(Clone, Debug)]
pub struct RemoteCatalogClient {
    client: Client,
    base_url: Url,
}

impl RemoteCatalogClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Internal(format!("Invalid remote catalog URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Internal(format!(
                "Remote catalog URL '{}' cannot be used as a base",
                base_url
            )));
        }
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base() was ruled out in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn collection(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint(segments);
        // ask for the whole collection instead of the first page
        url.query_pairs_mut().append_pair("limit", "0");
        url
    }

    async fn get_json<T>(&self, url: Url, query: &CatalogQuery) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!("Remote catalog GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transient("remote catalog request failed", e))?;

        classify_status(response.status().as_u16(), || describe(query))?;

        response
            .json::<T>()
            .await
            .map_err(|e| transient("remote catalog payload could not be decoded", e))
    }

    async fn get_products(&self, url: Url, query: &CatalogQuery) -> Result<Vec<Product>> {
        let envelope: ProductEnvelope = self.get_json(url, query).await?;
        let mut products = envelope.products;
        products.iter_mut().for_each(Product::truncate_description);
        Ok(products)
    }

    pub async fn all_products(&self) -> Result<Vec<Product>> {
        let query = CatalogQuery::AllProducts;
        let products = self.get_products(self.collection(&["products"]), &query).await?;
        require_matches(products, || describe(&query))
    }

    pub async fn product_by_id(&self, id: i64) -> Result<Product> {
        let query = CatalogQuery::ById(id);
        let id_segment = id.to_string();
        let mut product: Product = self
            .get_json(self.endpoint(&["products", &id_segment]), &query)
            .await?;
        product.truncate_description();
        Ok(product)
    }

    pub async fn products_by_category(&self, category: &str) -> Result<Vec<Product>> {
        let query = CatalogQuery::ByCategory(category.to_string());
        let products = self
            .get_products(self.collection(&["products", "category", category]), &query)
            .await?;
        let matching = products
            .into_iter()
            .filter(|p| p.category == category)
            .collect();
        require_matches(matching, || describe(&query))
    }

    pub async fn products_by_category_and_price_range(
        &self,
        category: &str,
        range: PriceRange,
    ) -> Result<Vec<Product>> {
        let query = CatalogQuery::ByCategoryAndPriceRange {
            category: category.to_string(),
            range,
        };
        let products = self
            .get_products(self.collection(&["products", "category", category]), &query)
            .await?;
        let matching = products
            .into_iter()
            .filter(|p| p.category == category && range.contains(p.price))
            .collect();
        require_matches(matching, || describe(&query))
    }

    pub async fn products_by_price_range(&self, range: PriceRange) -> Result<Vec<Product>> {
        let query = CatalogQuery::ByPriceRange(range);
        let products = self.get_products(self.collection(&["products"]), &query).await?;
        let matching = products
            .into_iter()
            .filter(|p| range.contains(p.price))
            .collect();
        require_matches(matching, || describe(&query))
    }

    pub async fn search_products(&self, term: &str) -> Result<Vec<Product>> {
        let query = CatalogQuery::BySearchTerm(term.to_string());
        let mut url = self.endpoint(&["products", "search"]);
        url.query_pairs_mut().append_pair("q", term);

        let needle = term.to_lowercase();
        let products = self.get_products(url, &query).await?;
        let matching = products
            .into_iter()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .collect();
        require_matches(matching, || describe(&query))
    }
}

#[async_trait]
impl CatalogBackend for RemoteCatalogClient {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn fetch(&self, query: &CatalogQuery) -> Result<CatalogValue> {
        match query {
            CatalogQuery::AllProducts => self.all_products().await.map(CatalogValue::Products),
            CatalogQuery::ById(id) => self.product_by_id(*id).await.map(CatalogValue::Product),
            CatalogQuery::ByCategory(category) => self
                .products_by_category(category)
                .await
                .map(CatalogValue::Products),
            CatalogQuery::ByCategoryAndPriceRange { category, range } => self
                .products_by_category_and_price_range(category, *range)
                .await
                .map(CatalogValue::Products),
            CatalogQuery::ByPriceRange(range) => self
                .products_by_price_range(*range)
                .await
                .map(CatalogValue::Products),
            CatalogQuery::BySearchTerm(term) => self
                .search_products(term)
                .await
                .map(CatalogValue::Products),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn product_json(id: i64, title: &str, category: &str, price: f64) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "description": format!("{} description", title),
            "category": category,
            "price": price,
            "images": [format!("https://cdn.example.com/{}.png", id)],
            "rating": 4.5
        })
    }

    async fn mount_list(server: &MockServer, route: &str, products: Vec<serde_json::Value>) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": products,
                "total": 3,
                "skip": 0,
                "limit": 0
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_all_products_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .and(query_param("limit", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [
                    product_json(1, "Essence Mascara", "beauty", 9.99),
                    product_json(2, "Eyeshadow Palette", "beauty", 19.99)
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = RemoteCatalogClient::new(&server.uri()).unwrap();
        let products = client.all_products().await.unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].title, "Essence Mascara");
        assert_eq!(products[1].images, vec!["https://cdn.example.com/2.png"]);
    }

    #[tokio::test]
    async fn test_product_by_id_reads_bare_object_and_truncates() {
        let server = MockServer::start().await;
        let long_description = "d".repeat(250);
        Mock::given(method("GET"))
            .and(path("/products/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "title": "Essence Mascara",
                "description": long_description,
                "category": "beauty",
                "price": 9.99,
                "images": []
            })))
            .mount(&server)
            .await;

        let client = RemoteCatalogClient::new(&server.uri()).unwrap();
        let product = client.product_by_id(1).await.unwrap();

        assert_eq!(product.id, 1);
        assert_eq!(product.description, "d".repeat(100));
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/999"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Product with id '999' not found"
            })))
            .mount(&server)
            .await;

        let client = RemoteCatalogClient::new(&server.uri()).unwrap();
        let err = client.product_by_id(999).await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_server_error_is_transient_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = RemoteCatalogClient::new(&server.uri()).unwrap();
        let err = client.all_products().await.unwrap_err();

        assert!(err.is_transient());
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = RemoteCatalogClient::new(&server.uri()).unwrap();
        assert!(client.all_products().await.unwrap_err().is_transient());
    }

    #[tokio::test]
    async fn test_category_and_price_filter_keeps_order() {
        let server = MockServer::start().await;
        mount_list(
            &server,
            "/products/category/electronics",
            vec![
                product_json(1, "Laptop Sleeve", "electronics", 100.0),
                product_json(2, "Headphones", "electronics", 150.0),
                product_json(3, "Face Cream", "beauty", 140.0),
                product_json(4, "Television", "electronics", 900.0),
            ],
        )
        .await;

        let client = RemoteCatalogClient::new(&server.uri()).unwrap();
        let range = PriceRange::new(50.0, 200.0).unwrap();
        let products = client
            .products_by_category_and_price_range("electronics", range)
            .await
            .unwrap();

        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_price_filter_bounds_are_inclusive() {
        let server = MockServer::start().await;
        mount_list(
            &server,
            "/products",
            vec![
                product_json(1, "A", "beauty", 50.0),
                product_json(2, "B", "beauty", 49.99),
                product_json(3, "C", "beauty", 200.0),
            ],
        )
        .await;

        let client = RemoteCatalogClient::new(&server.uri()).unwrap();
        let products = client
            .products_by_price_range(PriceRange::new(50.0, 200.0).unwrap())
            .await
            .unwrap();

        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_empty_filter_result_is_not_found() {
        let server = MockServer::start().await;
        mount_list(
            &server,
            "/products",
            vec![product_json(1, "A", "beauty", 10.0)],
        )
        .await;

        let client = RemoteCatalogClient::new(&server.uri()).unwrap();
        let err = client
            .products_by_price_range(PriceRange::new(500.0, 900.0).unwrap())
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_search_matches_titles_case_insensitively() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/search"))
            .and(query_param("q", "phone"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [
                    product_json(1, "iPhone 9", "smartphones", 549.0),
                    product_json(2, "Phone Stand", "accessories", 15.0),
                    product_json(3, "Wireless Charger", "accessories", 25.0)
                ]
            })))
            .mount(&server)
            .await;

        let client = RemoteCatalogClient::new(&server.uri()).unwrap();
        let products = client.search_products("phone").await.unwrap();

        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_fetch_dispatches_by_query_kind() {
        let server = MockServer::start().await;
        mount_list(
            &server,
            "/products/category/beauty",
            vec![
                product_json(1, "Mascara", "beauty", 9.99),
                product_json(2, "Stray", "groceries", 1.0),
            ],
        )
        .await;

        let client = RemoteCatalogClient::new(&server.uri()).unwrap();
        let value = client
            .fetch(&CatalogQuery::ByCategory("beauty".to_string()))
            .await
            .unwrap();

        let products = value.into_products().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].category, "beauty");
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        assert!(RemoteCatalogClient::new("not a url").is_err());
        assert!(RemoteCatalogClient::new("mailto:catalog@example.com").is_err());
    }
}
