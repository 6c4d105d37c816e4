//! Cart operations.
//!
//! The cart is addressed entirely by the session id header - the same cart
//! row set before and after login - so the cache key is scoped to the session
//! id, never to the token. Cart state has no freshness window: it is
//! refetched only after one of the mutations here invalidates it.
//!
//! Back-to-back mutations against the cart are not serialized by this layer;
//! callers should disable the triggering control while one is pending.

use serde_json::json;
use tracing::instrument;

use larkspur_core::{Cart, CartLineId, ProductId};

use crate::cache::{CacheKey, CacheValue};
use crate::fault::Fault;
use crate::shop::Shop;

impl Shop {
    /// Cache key of the current identity's cart.
    ///
    /// # Errors
    ///
    /// Returns a fault if the session id cannot be resolved.
    pub fn cart_key(&self) -> Result<CacheKey, Fault> {
        Ok(CacheKey::Cart {
            scope: self.scope()?,
        })
    }

    /// Get the current cart.
    ///
    /// # Errors
    ///
    /// Returns a fault if the backend call fails and no cached cart exists.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<Cart, Fault> {
        let key = self.cart_key()?;
        let client = self.client().clone();
        self.cache()
            .read(key, self.freshness().cart, || async move {
                let cart: Cart = client.get("/cart", &[]).await?;
                Ok(CacheValue::Cart(Box::new(cart)))
            })
            .await?
            .into_cart()
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Validation` locally when `quantity` is zero, and
    /// whatever the backend reports otherwise (out of stock, unknown
    /// product).
    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    pub async fn add_to_cart(&self, product_id: &ProductId, quantity: u32) -> Result<Cart, Fault> {
        if quantity == 0 {
            return Err(Fault::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }
        let key = self.cart_key()?;
        let body = json!({ "product_id": product_id, "quantity": quantity });
        self.mutate(self.client().post("/cart/lines", body), &[key])
            .await
    }

    /// Set the quantity of an existing cart line.
    ///
    /// Setting quantity to zero is rejected locally: removal is a distinct
    /// operation, use [`Self::remove_line`].
    ///
    /// # Errors
    ///
    /// Returns `Fault::NotFound` if the line no longer exists.
    #[instrument(skip(self), fields(line_id = %line_id, quantity))]
    pub async fn set_quantity(&self, line_id: &CartLineId, quantity: u32) -> Result<Cart, Fault> {
        if quantity == 0 {
            return Err(Fault::Validation(
                "quantity must be at least 1; remove the line instead".to_string(),
            ));
        }
        let key = self.cart_key()?;
        let path = format!("/cart/lines/{line_id}");
        let body = json!({ "quantity": quantity });
        self.mutate(self.client().put(&path, body), &[key]).await
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `Fault::NotFound` if the line no longer exists.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove_line(&self, line_id: &CartLineId) -> Result<Cart, Fault> {
        let key = self.cart_key()?;
        let path = format!("/cart/lines/{line_id}");
        self.mutate(self.client().delete(&path), &[key]).await
    }

    /// Remove every line and any applied coupon.
    ///
    /// # Errors
    ///
    /// Returns a fault if the backend call fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<(), Fault> {
        let key = self.cart_key()?;
        self.mutate(self.client().delete::<serde_json::Value>("/cart"), &[key])
            .await?;
        Ok(())
    }

    /// Apply a coupon code to the cart.
    ///
    /// The backend validates the code and resolves the concrete discount;
    /// rejection (expired, inactive, unknown) surfaces as a `Validation`
    /// fault carrying the backend's message.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Validation` when the backend rejects the code.
    #[instrument(skip(self), fields(code = %code))]
    pub async fn apply_coupon(&self, code: &str) -> Result<Cart, Fault> {
        let key = self.cart_key()?;
        let body = json!({ "code": code });
        self.mutate(self.client().post("/cart/coupon", body), &[key])
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::config::ClientConfig;
    use crate::http::{ApiRequest, ApiResponse, Transport};
    use crate::identity::MemoryProfileStore;

    struct CountingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn execute(&self, _request: ApiRequest) -> Result<ApiResponse, Fault> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Fault::Network("no backend in this test".to_string()))
        }
    }

    fn shop_with_counter() -> (Shop, Arc<CountingTransport>) {
        let config = ClientConfig::new("https://api.example.test").unwrap();
        let transport = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
        });
        let shop = Shop::with_transport(
            &config,
            Arc::new(MemoryProfileStore::new()),
            Arc::clone(&transport) as Arc<dyn Transport>,
        );
        (shop, transport)
    }

    #[tokio::test]
    async fn test_add_to_cart_rejects_zero_quantity_locally() {
        let (shop, transport) = shop_with_counter();
        let result = shop.add_to_cart(&ProductId::new("p_1"), 0).await;
        assert_eq!(
            result.unwrap_err(),
            Fault::Validation("quantity must be at least 1".to_string())
        );
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_set_quantity_rejects_zero_locally() {
        let (shop, transport) = shop_with_counter();
        let result = shop.set_quantity(&CartLineId::new("l_1"), 0).await;
        assert_eq!(
            result.unwrap_err(),
            Fault::Validation("quantity must be at least 1; remove the line instead".to_string())
        );
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }
}
