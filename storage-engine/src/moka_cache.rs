use async_trait::async_trait;
use catalog::ports::CacheStore;
use moka::Expiry;
use moka::future::Cache;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// A cached value together with its own sliding lifetime
#[derive(Clone, Debug)]
struct Expiring<V> {
    value: V,
    ttl: Duration,
}

/// Every create, update and read pushes expiry `ttl` into the future
struct SlidingExpiry;

impl<K, V> Expiry<K, Expiring<V>> for SlidingExpiry {
    fn expire_after_create(
        &self,
        _key: &K,
        entry: &Expiring<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_read(
        &self,
        _key: &K,
        entry: &Expiring<V>,
        _read_at: Instant,
        _duration_until_expiry: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &K,
        entry: &Expiring<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Moka-based cache implementation with per-entry sliding TTL
/// Provides lock-free, concurrent cache with optional size bounds
pub struct MokaCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    cache: Cache<K, Expiring<V>>,
}

impl<K, V> MokaCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    /// Create a new unbounded Moka cache
    pub fn new_unbounded() -> Self {
        Self::new("catalog".to_string(), None)
    }

    /// Create a new bounded Moka cache with max entries
    pub fn new_bounded(max_entries: u64) -> Self {
        Self::new("catalog".to_string(), Some(max_entries))
    }

    /// Create a Moka cache from name and optional capacity
    pub fn new(name: String, max_entries: Option<u64>) -> Self {
        let mut builder = Cache::builder().name(&name).expire_after(SlidingExpiry);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
        }
    }

    /// Approximate number of live entries
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Flush pending maintenance so counts and evictions are up to date
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl<K, V> CacheStore<K, V> for MokaCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        // Either doesn't exist or has been idle past its TTL
        self.cache.get(key).await.map(|entry| entry.value)
    }

    async fn put(&self, key: K, val: V, ttl: Duration) {
        self.cache.insert(key, Expiring { value: val, ttl }).await;
    }
}

impl<K, V> Debug for MokaCache<K, V>
where
    K: Debug + Hash + Eq + Send + Sync + 'static,
    V: Debug + Send + Sync + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCache")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::ports::CatalogBackend;
    use catalog::{CatalogAccessor, CatalogQuery, CatalogValue, Product};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{sleep, Duration};

    const LONG_TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_moka_cache_put_and_get() {
        let cache = MokaCache::new("test".to_string(), None);

        let key = "hello";
        let value = "world";
        cache.put(key, value, LONG_TTL).await;

        assert_eq!(cache.get(&key).await, Some(value));
    }

    #[tokio::test]
    async fn test_moka_cache_get_nonexistent() {
        let cache: MokaCache<&str, &str> = MokaCache::new("test".to_string(), None);

        assert_eq!(cache.get(&"nonexistent").await, None);
    }

    #[tokio::test]
    async fn test_moka_cache_overwrite() {
        let cache = MokaCache::new("test".to_string(), None);

        let key = "key";
        cache.put(key, "value1", LONG_TTL).await;
        cache.put(key, "value2", LONG_TTL).await;

        assert_eq!(cache.get(&key).await, Some("value2"));
    }

    #[tokio::test]
    async fn test_moka_cache_idle_entry_expires() {
        let cache = MokaCache::new("test".to_string(), None);

        cache.put("idle", "value", Duration::from_millis(100)).await;
        assert_eq!(cache.get(&"idle").await, Some("value"));

        // Wait for expiration
        sleep(Duration::from_millis(250)).await;

        assert_eq!(cache.get(&"idle").await, None);
    }

    #[tokio::test]
    async fn test_moka_cache_read_slides_expiry() {
        let cache = MokaCache::new("test".to_string(), None);
        let ttl = Duration::from_millis(400);

        cache.put("busy", "value", ttl).await;

        // Each read lands inside the window and restarts it, so the entry
        // outlives its original deadline
        for _ in 0..4 {
            sleep(Duration::from_millis(200)).await;
            assert_eq!(cache.get(&"busy").await, Some("value"));
        }

        sleep(Duration::from_millis(700)).await;
        assert_eq!(cache.get(&"busy").await, None);
    }

    #[tokio::test]
    async fn test_moka_cache_ttl_is_per_entry() {
        let cache = MokaCache::new("test".to_string(), None);

        cache.put("short", "a", Duration::from_millis(100)).await;
        cache.put("long", "b", LONG_TTL).await;

        sleep(Duration::from_millis(250)).await;

        assert_eq!(cache.get(&"short").await, None);
        assert_eq!(cache.get(&"long").await, Some("b"));
    }

    #[tokio::test]
    async fn test_moka_cache_bounded() {
        let cache = MokaCache::new_bounded(2); // Max 2 entries

        cache.put("key1", "value1", LONG_TTL).await;
        cache.put("key2", "value2", LONG_TTL).await;
        cache.put("key3", "value3", LONG_TTL).await;

        // Wait for eviction to take effect
        cache.sync().await;

        assert!(cache.entry_count() <= 2, "Cache should have at most 2 entries");
    }

    struct CountingBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CatalogBackend for CountingBackend {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch(&self, query: &CatalogQuery) -> shared::Result<CatalogValue> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let id = match query {
                CatalogQuery::ById(id) => *id,
                _ => 0,
            };
            Ok(CatalogValue::Product(Product {
                id,
                title: "Desk Lamp".to_string(),
                price: 24.5,
                description: "Warm light".to_string(),
                category: "home".to_string(),
                images: vec![],
            }))
        }
    }

    #[tokio::test]
    async fn test_accessor_entries_expire_after_configured_idle_time() {
        let cache: Arc<MokaCache<String, CatalogValue>> = Arc::new(MokaCache::new_unbounded());
        let backend = Arc::new(CountingBackend {
            calls: AtomicUsize::new(0),
        });
        let accessor = CatalogAccessor::new(cache.clone(), backend.clone(), backend.clone())
            .with_entry_ttl(Duration::from_millis(300));

        accessor.remote().product_by_id(7).await.unwrap();
        sleep(Duration::from_millis(100)).await;
        accessor.remote().product_by_id(7).await.unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        sleep(Duration::from_millis(700)).await;
        accessor.remote().product_by_id(7).await.unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_moka_cache_shared_across_tasks() {
        let cache = Arc::new(MokaCache::new_unbounded());

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache.put(format!("key-{}", i), i, LONG_TTL).await;
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        for i in 0..8 {
            assert_eq!(cache.get(&format!("key-{}", i)).await, Some(i));
        }
    }
}
