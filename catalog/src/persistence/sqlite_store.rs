use crate::classify::{describe, require_matches, transient};
use crate::domain::{CatalogQuery, CatalogValue, Product};
use crate::ports::CatalogBackend;
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, Connection, Row};
use shared::{Error, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS products (
    id          INTEGER PRIMARY KEY,
    title       TEXT NOT NULL,
    price       REAL NOT NULL CHECK (price >= 0),
    description TEXT NOT NULL DEFAULT '',
    category    TEXT NOT NULL,
    images      TEXT NOT NULL DEFAULT '[]'
)";

const SELECT_COLUMNS: &str = "SELECT id, title, price, description, category, images FROM products";

/// SQLite-backed local product table
///
/// Every predicate is pushed down into SQL:
/// - category is an exact, case-sensitive match
/// - price bounds are inclusive (`BETWEEN`)
/// - title search is a case-insensitive substring match; case folding is
///   SQLite's `lower()` (ASCII only) and the term is never treated as a pattern
#[derive(Clone)]
pub struct LocalCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl LocalCatalogStore {
    /// Open (or create) the database file and make sure the table exists
    /// Creates the parent directory if it doesn't exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Internal(format!("Failed to create directory: {}", e)))?;
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::Internal(format!("Failed to open SQLite database: {}", e)))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Internal(format!("Failed to open SQLite database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::Internal(format!("Failed to create products table: {}", e)))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert or replace products by id
    pub async fn insert_products(&self, products: Vec<Product>) -> Result<usize> {
        self.run(move |conn| {
            let tx = conn.unchecked_transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR REPLACE INTO products (id, title, price, description, category, images)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;
                for product in &products {
                    let images = serde_json::to_string(&product.images)
                        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                    stmt.execute(rusqlite::params![
                        product.id,
                        product.title,
                        product.price,
                        product.description,
                        product.category,
                        images,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(products.len())
        })
        .await
    }

    /// Runs `f` on the blocking pool so SQLite I/O never stalls async workers
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&*conn)
        })
        .await
        .map_err(|e| transient("local store task failed", e))?
        .map_err(|e| transient("local store query failed", e))
    }

    async fn select(&self, query: &CatalogQuery) -> Result<Vec<Product>> {
        let (predicate, params) = predicate_for(query);
        let sql = format!("{} {} ORDER BY id", SELECT_COLUMNS, predicate);
        debug!("Local store query: {}", sql);

        self.run(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(params), product_from_row)?;
            rows.collect::<rusqlite::Result<Vec<Product>>>()
        })
        .await
    }

    pub async fn all_products(&self) -> Result<Vec<Product>> {
        self.collection(&CatalogQuery::AllProducts).await
    }

    pub async fn product_by_id(&self, id: i64) -> Result<Product> {
        let query = CatalogQuery::ById(id);
        self.select(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("{} not found", describe(&query))))
    }

    async fn collection(&self, query: &CatalogQuery) -> Result<Vec<Product>> {
        let products = self.select(query).await?;
        require_matches(products, || describe(query))
    }
}

fn predicate_for(query: &CatalogQuery) -> (&'static str, Vec<Value>) {
    match query {
        CatalogQuery::AllProducts => ("", vec![]),
        CatalogQuery::ById(id) => ("WHERE id = ?1", vec![Value::Integer(*id)]),
        CatalogQuery::ByCategory(category) => {
            ("WHERE category = ?1", vec![Value::Text(category.clone())])
        }
        CatalogQuery::ByCategoryAndPriceRange { category, range } => (
            "WHERE category = ?1 AND price BETWEEN ?2 AND ?3",
            vec![
                Value::Text(category.clone()),
                Value::Real(range.min()),
                Value::Real(range.max()),
            ],
        ),
        CatalogQuery::ByPriceRange(range) => (
            "WHERE price BETWEEN ?1 AND ?2",
            vec![Value::Real(range.min()), Value::Real(range.max())],
        ),
        CatalogQuery::BySearchTerm(term) => (
            "WHERE instr(lower(title), lower(?1)) > 0",
            vec![Value::Text(term.clone())],
        ),
    }
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    let images: String = row.get(5)?;
    let images = serde_json::from_str(&images)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    Ok(Product {
        id: row.get(0)?,
        title: row.get(1)?,
        price: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        images,
    })
}

#[async_trait]
impl CatalogBackend for LocalCatalogStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn fetch(&self, query: &CatalogQuery) -> Result<CatalogValue> {
        if let CatalogQuery::ById(id) = query {
            return self.product_by_id(*id).await.map(CatalogValue::Product);
        }
        self.collection(query).await.map(CatalogValue::Products)
    }
}
