//! Checkout and order history.

use serde_json::json;
use tracing::instrument;

use larkspur_core::{Order, OrderId, ShippingAddress};

use crate::cache::{CacheKey, CacheValue};
use crate::fault::Fault;
use crate::shop::Shop;

impl Shop {
    /// Place an order from the current cart.
    ///
    /// Checkout requires authentication: guests get `Fault::Auth` locally so
    /// the view can prompt for login before anything is sent. On success the
    /// cart and order-history slots are invalidated - the backend has
    /// consumed the cart.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Auth` for guests and `Fault::Validation` when the
    /// backend rejects the order (empty cart, stock changes).
    #[instrument(skip(self, address))]
    pub async fn checkout(&self, address: &ShippingAddress) -> Result<Order, Fault> {
        if !self.identity()?.is_authenticated() {
            return Err(Fault::Auth);
        }
        let scope = self.scope()?;
        let affected = [
            CacheKey::Cart {
                scope: scope.clone(),
            },
            CacheKey::Orders { scope },
        ];
        let body = json!({ "shipping_address": address });
        self.mutate(self.client().post("/orders", body), &affected)
            .await
    }

    /// Get the caller's order history, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Auth` when the token is missing or expired.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, Fault> {
        let key = CacheKey::Orders {
            scope: self.scope()?,
        };
        let client = self.client().clone();
        self.cache()
            .read(key, self.freshness().orders, || async move {
                let orders: Vec<Order> = client.get("/orders", &[]).await?;
                Ok(CacheValue::Orders(orders))
            })
            .await?
            .into_orders()
    }

    /// Get a single order by id. Not cached: order detail views are rare and
    /// always want current status.
    ///
    /// # Errors
    ///
    /// Returns `Fault::NotFound` if the order does not exist or belongs to
    /// another identity.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order(&self, order_id: &OrderId) -> Result<Order, Fault> {
        let path = format!("/orders/{order_id}");
        self.client().get(&path, &[]).await
    }
}
