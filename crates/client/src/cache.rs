//! Keyed response cache with coalesced reads and stale-while-error.
//!
//! Each logical resource identity maps to one slot. A slot's value is served
//! while fresh; a stale or missing slot runs the caller's producer under a
//! per-key fetch lock, so concurrent readers of the same key share a single
//! backend call. A failed refetch keeps the prior value retrievable and
//! records the fault for UI error banners; invalidation marks slots stale
//! without refetching, leaving the next read to do the work.
//!
//! Expiry is checked lazily on read. There is no sweeper task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::Mutex as FetchLock;
use tracing::debug;

use larkspur_core::{
    Cart, Category, Coupon, Order, Page, Product, Profile, PromoSection, Review,
};

use crate::config::Freshness;
use crate::fault::Fault;

// =============================================================================
// Keys and values
// =============================================================================

/// Logical identity of a cached resource.
///
/// Identity-scoped variants carry the owning session id so two identities
/// can never read each other's slots.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// A single product, by slug.
    Product(String),
    /// A product listing, by canonical filter string.
    Products(String),
    /// All categories.
    Categories,
    /// A single category, by slug.
    Category(String),
    /// Promotional home-page sections.
    Sections,
    /// Reviews for a product, by product id.
    Reviews(String),
    /// The cart belonging to a session.
    Cart { scope: String },
    /// Order history belonging to a session.
    Orders { scope: String },
    /// The profile belonging to a session.
    Profile { scope: String },
    /// Admin list of coupons.
    Coupons,
    /// Admin list of users.
    Users,
    /// Admin list of all orders.
    AllOrders,
}

impl CacheKey {
    /// The session id this key is scoped to, if any.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        match self {
            Self::Cart { scope } | Self::Orders { scope } | Self::Profile { scope } => {
                Some(scope.as_str())
            }
            _ => None,
        }
    }
}

/// Cached value types, one variant per cacheable resource.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Page<Product>),
    Categories(Vec<Category>),
    Category(Box<Category>),
    Sections(Vec<PromoSection>),
    Reviews(Vec<Review>),
    Cart(Box<Cart>),
    Orders(Vec<Order>),
    Profile(Box<Profile>),
    Coupons(Vec<Coupon>),
    Users(Vec<Profile>),
}

macro_rules! cache_value_accessor {
    ($fn_name:ident, $variant:ident, Box<$ty:ty>) => {
        pub(crate) fn $fn_name(self) -> Result<$ty, Fault> {
            match self {
                Self::$variant(v) => Ok(*v),
                other => Err(other.kind_mismatch(stringify!($variant))),
            }
        }
    };
    ($fn_name:ident, $variant:ident, $ty:ty) => {
        pub(crate) fn $fn_name(self) -> Result<$ty, Fault> {
            match self {
                Self::$variant(v) => Ok(v),
                other => Err(other.kind_mismatch(stringify!($variant))),
            }
        }
    };
}

impl CacheValue {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Product(_) => "Product",
            Self::Products(_) => "Products",
            Self::Categories(_) => "Categories",
            Self::Category(_) => "Category",
            Self::Sections(_) => "Sections",
            Self::Reviews(_) => "Reviews",
            Self::Cart(_) => "Cart",
            Self::Orders(_) => "Orders",
            Self::Profile(_) => "Profile",
            Self::Coupons(_) => "Coupons",
            Self::Users(_) => "Users",
        }
    }

    fn kind_mismatch(&self, expected: &str) -> Fault {
        Fault::internal(format!(
            "cache slot held {} where {expected} was expected",
            self.kind_name()
        ))
    }

    cache_value_accessor!(into_product, Product, Box<Product>);
    cache_value_accessor!(into_products, Products, Page<Product>);
    cache_value_accessor!(into_categories, Categories, Vec<Category>);
    cache_value_accessor!(into_category, Category, Box<Category>);
    cache_value_accessor!(into_sections, Sections, Vec<PromoSection>);
    cache_value_accessor!(into_reviews, Reviews, Vec<Review>);
    cache_value_accessor!(into_cart, Cart, Box<Cart>);
    cache_value_accessor!(into_orders, Orders, Vec<Order>);
    cache_value_accessor!(into_profile, Profile, Box<Profile>);
    cache_value_accessor!(into_coupons, Coupons, Vec<Coupon>);
    cache_value_accessor!(into_users, Users, Vec<Profile>);
}

// =============================================================================
// Slots
// =============================================================================

/// Trust level of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Value is current within its freshness window.
    Fresh,
    /// A mutation declared the value affected; next read refetches.
    Stale,
    /// The last refetch failed; any retained value is served stale.
    Error,
}

/// Observable state of a slot, for views that surface staleness or errors.
#[derive(Debug, Clone)]
pub struct SlotStatus {
    /// Current trust level.
    pub state: SlotState,
    /// Time since the last successful fetch.
    pub age: Duration,
    /// Message of the last failed refetch, if the slot is in error.
    pub error: Option<String>,
}

struct Slot {
    value: Option<CacheValue>,
    fetched_at: Instant,
    state: SlotState,
    last_error: Option<(Instant, Fault)>,
}

// =============================================================================
// QueryCache
// =============================================================================

/// The process-local response cache. One instance per [`crate::Shop`].
#[derive(Default)]
pub struct QueryCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    // Bumped on every invalidation. A fetch snapshots its key's generation
    // before running; if the counter moved while the fetch was in flight,
    // the result is stored already stale.
    generations: Mutex<HashMap<CacheKey, u64>>,
    // One async lock per key; coalesces concurrent fetches. Bounded by the
    // key space, so entries are never evicted.
    fetch_locks: Mutex<HashMap<CacheKey, Arc<FetchLock<()>>>>,
}

impl QueryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read through the cache.
    ///
    /// Returns the cached value when the slot is fresh within `freshness`.
    /// Otherwise runs `producer` under the key's fetch lock; a reader that
    /// arrives while a fetch is in flight waits on the lock and then reuses
    /// the fetch's outcome instead of issuing its own backend call.
    ///
    /// # Errors
    ///
    /// Propagates the producer's fault only when no prior value exists;
    /// with a prior value the fault is recorded and the stale value served.
    pub async fn read<F, Fut>(
        &self,
        key: CacheKey,
        freshness: Freshness,
        producer: F,
    ) -> Result<CacheValue, Fault>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CacheValue, Fault>>,
    {
        let wait_started = Instant::now();

        if let Some(value) = self.fresh_value(&key, freshness) {
            debug!(?key, "cache hit");
            return Ok(value);
        }

        let lock = self.fetch_lock(&key);
        let _guard = lock.lock().await;

        // Re-check: the fetch we waited behind may have refilled the slot.
        if let Some(value) = self.fresh_value(&key, freshness) {
            debug!(?key, "cache hit after coalesced fetch");
            return Ok(value);
        }
        if let Some(fault) = self.error_since(&key, wait_started) {
            // The fetch we waited behind failed; reuse its outcome.
            return self.stale_value(&key).ok_or(fault);
        }

        let generation = self.generation(&key);
        match producer().await {
            Ok(value) => {
                self.store_fetched(&key, value.clone(), generation);
                Ok(value)
            }
            Err(fault) => {
                debug!(?key, %fault, "producer failed");
                match self.record_error(&key, fault.clone()) {
                    Some(prior) => Ok(prior),
                    None => Err(fault),
                }
            }
        }
    }

    /// Mark the given keys stale. Values are retained; nothing is refetched
    /// until the next read. A fetch in flight for one of these keys stores
    /// its result stale rather than overriding the invalidation.
    pub fn invalidate(&self, keys: &[CacheKey]) {
        {
            let mut generations = lock(&self.generations);
            for key in keys {
                *generations.entry(key.clone()).or_default() += 1;
            }
        }
        let mut slots = lock(&self.slots);
        for key in keys {
            if let Some(slot) = slots.get_mut(key) {
                slot.state = SlotState::Stale;
                debug!(?key, "invalidated");
            }
        }
    }

    /// Mark every key matching the predicate stale.
    pub fn invalidate_where(&self, predicate: impl Fn(&CacheKey) -> bool) {
        let matching: Vec<CacheKey> = {
            let generations = lock(&self.generations);
            generations.keys().filter(|key| predicate(key)).cloned().collect()
        };
        self.invalidate(&matching);
    }

    /// Mark every slot scoped to the given session id stale.
    ///
    /// Used at the login/logout boundary: the session id survives, but
    /// identity-scoped resources must be refetched under the new headers.
    pub fn invalidate_identity(&self, scope: &str) {
        self.invalidate_where(|key| key.scope() == Some(scope));
    }

    /// Observable state of a slot, if the key has ever been read.
    #[must_use]
    pub fn status(&self, key: &CacheKey) -> Option<SlotStatus> {
        let slots = lock(&self.slots);
        slots.get(key).map(|slot| SlotStatus {
            state: slot.state,
            age: slot.fetched_at.elapsed(),
            error: slot.last_error.as_ref().map(|(_, fault)| fault.to_string()),
        })
    }

    // =========================================================================
    // Slot bookkeeping
    // =========================================================================

    fn fetch_lock(&self, key: &CacheKey) -> Arc<FetchLock<()>> {
        let mut locks = lock(&self.fetch_locks);
        Arc::clone(locks.entry(key.clone()).or_default())
    }

    fn fresh_value(&self, key: &CacheKey, freshness: Freshness) -> Option<CacheValue> {
        let slots = lock(&self.slots);
        let slot = slots.get(key)?;
        if slot.state == SlotState::Fresh && freshness.allows(slot.fetched_at.elapsed()) {
            slot.value.clone()
        } else {
            None
        }
    }

    fn stale_value(&self, key: &CacheKey) -> Option<CacheValue> {
        let slots = lock(&self.slots);
        slots.get(key).and_then(|slot| slot.value.clone())
    }

    fn error_since(&self, key: &CacheKey, since: Instant) -> Option<Fault> {
        let slots = lock(&self.slots);
        let (at, fault) = slots.get(key)?.last_error.as_ref()?;
        (*at >= since).then(|| fault.clone())
    }

    /// Current generation of a key, creating the counter on first use.
    fn generation(&self, key: &CacheKey) -> u64 {
        *lock(&self.generations).entry(key.clone()).or_default()
    }

    /// Store a fetched value. Fresh only if no invalidation landed since
    /// the fetch snapshotted `generation`.
    fn store_fetched(&self, key: &CacheKey, value: CacheValue, generation: u64) {
        let state = if self.generation(key) == generation {
            SlotState::Fresh
        } else {
            debug!(?key, "invalidated during fetch; storing stale");
            SlotState::Stale
        };
        let mut slots = lock(&self.slots);
        slots.insert(
            key.clone(),
            Slot {
                value: Some(value),
                fetched_at: Instant::now(),
                state,
                last_error: None,
            },
        );
    }

    /// Record a failed refetch, returning the retained prior value if any.
    fn record_error(&self, key: &CacheKey, fault: Fault) -> Option<CacheValue> {
        let mut slots = lock(&self.slots);
        let slot = slots.entry(key.clone()).or_insert_with(|| Slot {
            value: None,
            fetched_at: Instant::now(),
            state: SlotState::Error,
            last_error: None,
        });
        slot.state = SlotState::Error;
        slot.last_error = Some((Instant::now(), fault));
        slot.value.clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn categories(n: usize) -> CacheValue {
        let items = (0..n)
            .map(|i| Category {
                id: larkspur_core::CategoryId::new(format!("c_{i}")),
                slug: format!("cat-{i}"),
                name: format!("Category {i}"),
                description: None,
            })
            .collect();
        CacheValue::Categories(items)
    }

    fn window(secs: u64) -> Freshness {
        Freshness::Window(Duration::from_secs(secs))
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_producer() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            cache
                .read(CacheKey::Categories, window(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(categories(1))
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_fetch() {
        let cache = Arc::new(QueryCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let producer = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(categories(1))
            }
        };

        let a = cache.read(CacheKey::Categories, window(60), producer(Arc::clone(&calls)));
        let b = cache.read(CacheKey::Categories, window(60), producer(Arc::clone(&calls)));
        let (a, b) = tokio::join!(a, b);

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        cache
            .read(CacheKey::Categories, window(600), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(categories(1))
            })
            .await
            .unwrap();
        cache.invalidate(&[CacheKey::Categories]);
        assert_eq!(
            cache.status(&CacheKey::Categories).unwrap().state,
            SlotState::Stale
        );

        let value = cache
            .read(CacheKey::Categories, window(600), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(categories(2))
            })
            .await
            .unwrap();
        match value {
            CacheValue::Categories(items) => assert_eq!(items.len(), 2),
            other => panic!("unexpected value: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_during_fetch_stores_result_stale() {
        let cache = Arc::new(QueryCache::new());
        let key = CacheKey::Cart {
            scope: "sess_a".to_string(),
        };

        let fetch = tokio::spawn({
            let cache = Arc::clone(&cache);
            let key = key.clone();
            async move {
                cache
                    .read(key, Freshness::MutationOnly, || async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok(CacheValue::Cart(Box::new(Cart::empty())))
                    })
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        cache.invalidate(&[key.clone()]);
        fetch.await.unwrap().unwrap();

        // The fetch began before the invalidation, so its result may predate
        // whatever the mutation changed.
        assert_eq!(cache.status(&key).unwrap().state, SlotState::Stale);

        let calls = AtomicUsize::new(0);
        cache
            .read(key.clone(), Freshness::MutationOnly, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(CacheValue::Cart(Box::new(Cart::empty())))
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.status(&key).unwrap().state, SlotState::Fresh);
    }

    #[tokio::test]
    async fn test_invalidating_unknown_key_is_a_no_op() {
        let cache = QueryCache::new();
        cache.invalidate(&[CacheKey::Sections]);
        assert!(cache.status(&CacheKey::Sections).is_none());
    }

    #[tokio::test]
    async fn test_stale_while_error_serves_prior_value() {
        let cache = QueryCache::new();

        cache
            .read(CacheKey::Categories, window(600), || async {
                Ok(categories(3))
            })
            .await
            .unwrap();
        cache.invalidate(&[CacheKey::Categories]);

        let value = cache
            .read(CacheKey::Categories, window(600), || async {
                Err(Fault::Network("connection refused".to_string()))
            })
            .await
            .unwrap();
        match value {
            CacheValue::Categories(items) => assert_eq!(items.len(), 3),
            other => panic!("unexpected value: {other:?}"),
        }

        let status = cache.status(&CacheKey::Categories).unwrap();
        assert_eq!(status.state, SlotState::Error);
        assert_eq!(
            status.error.as_deref(),
            Some("request failed: connection refused")
        );
    }

    #[tokio::test]
    async fn test_error_with_no_prior_value_propagates() {
        let cache = QueryCache::new();
        let result = cache
            .read(CacheKey::Categories, window(600), || async {
                Err(Fault::Network("connection refused".to_string()))
            })
            .await;
        assert_eq!(
            result.unwrap_err(),
            Fault::Network("connection refused".to_string())
        );
        assert_eq!(
            cache.status(&CacheKey::Categories).unwrap().state,
            SlotState::Error
        );
    }

    #[tokio::test]
    async fn test_error_slot_retries_on_next_read() {
        let cache = QueryCache::new();
        let _ = cache
            .read(CacheKey::Categories, window(600), || async {
                Err(Fault::Network("down".to_string()))
            })
            .await;

        let value = cache
            .read(CacheKey::Categories, window(600), || async {
                Ok(categories(2))
            })
            .await
            .unwrap();
        match value {
            CacheValue::Categories(items) => assert_eq!(items.len(), 2),
            other => panic!("unexpected value: {other:?}"),
        }
        assert_eq!(
            cache.status(&CacheKey::Categories).unwrap().state,
            SlotState::Fresh
        );
    }

    #[tokio::test]
    async fn test_identity_scoped_invalidation() {
        let cache = QueryCache::new();
        let cart_key = CacheKey::Cart {
            scope: "sess_a".to_string(),
        };
        let other_cart = CacheKey::Cart {
            scope: "sess_b".to_string(),
        };

        for key in [&cart_key, &other_cart] {
            cache
                .read(key.clone(), Freshness::MutationOnly, || async {
                    Ok(CacheValue::Cart(Box::new(Cart::empty())))
                })
                .await
                .unwrap();
        }

        cache.invalidate_identity("sess_a");
        assert_eq!(cache.status(&cart_key).unwrap().state, SlotState::Stale);
        assert_eq!(cache.status(&other_cart).unwrap().state, SlotState::Fresh);
    }

    #[tokio::test]
    async fn test_window_expiry_is_checked_lazily() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        cache
            .read(CacheKey::Sections, window(600), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(CacheValue::Sections(Vec::new()))
            })
            .await
            .unwrap();
        // A zero-width window means every read refetches.
        cache
            .read(CacheKey::Sections, Freshness::Window(Duration::ZERO), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(CacheValue::Sections(Vec::new()))
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
