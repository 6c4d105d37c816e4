//! The top-level client: shared state plus the mutation-invalidate contract.
//!
//! [`Shop`] is cheaply cloneable via `Arc` and owns the request client, the
//! response cache, and the identity vault. Typed operations live in
//! [`crate::ops`], grouped by surface; they all flow through the helpers
//! here so cache keys and invalidation stay in one place.

use std::sync::Arc;

use crate::cache::{CacheKey, QueryCache, SlotStatus};
use crate::config::{ClientConfig, FreshnessConfig};
use crate::fault::Fault;
use crate::http::{HttpTransport, RequestClient, Transport};
use crate::identity::{Identity, IdentityVault, ProfileError, ProfileStore};

/// Client for the Larkspur storefront and admin backend.
#[derive(Clone)]
pub struct Shop {
    inner: Arc<ShopInner>,
}

struct ShopInner {
    client: RequestClient,
    cache: QueryCache,
    vault: IdentityVault,
    freshness: FreshnessConfig,
}

impl Shop {
    /// Create a client over the real HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns a fault if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, store: Arc<dyn ProfileStore>) -> Result<Self, Fault> {
        let transport = Arc::new(HttpTransport::new(config.request_timeout)?);
        Ok(Self::with_transport(config, store, transport))
    }

    /// Create a client over an arbitrary transport.
    ///
    /// This is the seam integration tests use to script backend behavior.
    #[must_use]
    pub fn with_transport(
        config: &ClientConfig,
        store: Arc<dyn ProfileStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let vault = IdentityVault::new(store);
        let client = RequestClient::new(transport, config.base_url.clone(), vault.clone());
        Self {
            inner: Arc::new(ShopInner {
                client,
                cache: QueryCache::new(),
                vault,
                freshness: config.freshness,
            }),
        }
    }

    /// Resolve the current identity (guest or authenticated).
    ///
    /// # Errors
    ///
    /// Returns a fault if the profile store cannot persist a newly generated
    /// session id.
    pub fn identity(&self) -> Result<Identity, Fault> {
        self.inner.vault.resolve().map_err(ProfileError::into_fault)
    }

    /// Observable cache state for a key, for views that surface staleness.
    #[must_use]
    pub fn cache_status(&self, key: &CacheKey) -> Option<SlotStatus> {
        self.inner.cache.status(key)
    }

    /// Run a write operation, then mark the affected cache keys stale.
    ///
    /// Invalidation happens strictly after the backend confirms success; a
    /// failed operation leaves every slot untouched. Nothing is eagerly
    /// refetched - the next read of an affected key does that. Mutations are
    /// never retried here: operations like "increase quantity" are not
    /// idempotent, and a silent retry would risk double application.
    pub(crate) async fn mutate<T>(
        &self,
        op: impl Future<Output = Result<T, Fault>>,
        affected: &[CacheKey],
    ) -> Result<T, Fault> {
        let value = op.await?;
        self.inner.cache.invalidate(affected);
        Ok(value)
    }

    pub(crate) fn client(&self) -> &RequestClient {
        &self.inner.client
    }

    pub(crate) fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    pub(crate) fn vault(&self) -> &IdentityVault {
        &self.inner.vault
    }

    pub(crate) fn freshness(&self) -> &FreshnessConfig {
        &self.inner.freshness
    }

    /// Session id of the current identity, used to scope cache keys.
    pub(crate) fn scope(&self) -> Result<String, Fault> {
        Ok(self.identity()?.session_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cache::{CacheValue, SlotState};
    use crate::config::Freshness;
    use crate::http::{ApiRequest, ApiResponse};
    use crate::identity::MemoryProfileStore;
    use async_trait::async_trait;
    use larkspur_core::Cart;

    struct UnreachableTransport;

    #[async_trait]
    impl Transport for UnreachableTransport {
        async fn execute(&self, _request: ApiRequest) -> Result<ApiResponse, Fault> {
            Err(Fault::Network("no backend in this test".to_string()))
        }
    }

    fn shop() -> Shop {
        let config = ClientConfig::new("https://api.example.test").unwrap();
        Shop::with_transport(
            &config,
            Arc::new(MemoryProfileStore::new()),
            Arc::new(UnreachableTransport),
        )
    }

    async fn seed_cart(shop: &Shop, key: &CacheKey) {
        shop.cache()
            .read(key.clone(), Freshness::MutationOnly, || async {
                Ok(CacheValue::Cart(Box::new(Cart::empty())))
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_successful_mutation_invalidates_affected_keys() {
        let shop = shop();
        let key = CacheKey::Cart {
            scope: shop.scope().unwrap(),
        };
        seed_cart(&shop, &key).await;

        let result = shop.mutate(async { Ok(()) }, std::slice::from_ref(&key)).await;
        assert!(result.is_ok());
        assert_eq!(shop.cache_status(&key).unwrap().state, SlotState::Stale);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_cache_untouched() {
        let shop = shop();
        let key = CacheKey::Cart {
            scope: shop.scope().unwrap(),
        };
        seed_cart(&shop, &key).await;

        let result: Result<(), Fault> = shop
            .mutate(
                async { Err(Fault::Validation("out of stock".to_string())) },
                std::slice::from_ref(&key),
            )
            .await;
        assert_eq!(
            result.unwrap_err(),
            Fault::Validation("out of stock".to_string())
        );
        assert_eq!(shop.cache_status(&key).unwrap().state, SlotState::Fresh);
    }

    #[tokio::test]
    async fn test_mutation_only_invalidates_declared_keys() {
        let shop = shop();
        let cart_key = CacheKey::Cart {
            scope: shop.scope().unwrap(),
        };
        seed_cart(&shop, &cart_key).await;
        shop.cache()
            .read(CacheKey::Categories, Freshness::MutationOnly, || async {
                Ok(CacheValue::Categories(Vec::new()))
            })
            .await
            .unwrap();

        shop.mutate(async { Ok(()) }, std::slice::from_ref(&cart_key))
            .await
            .unwrap();

        assert_eq!(
            shop.cache_status(&CacheKey::Categories).unwrap().state,
            SlotState::Fresh
        );
    }
}
