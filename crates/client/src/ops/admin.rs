//! Administrative CRUD: categories, products, coupons, users, orders, and
//! promotional sections.
//!
//! These operations hit `/admin/*` routes that require an admin-role token;
//! a non-admin caller gets `Fault::Auth` from the backend. Every successful
//! write flows through the same mutation-invalidate contract as storefront
//! writes, so cached catalog data refreshes on the next read.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use larkspur_core::{
    Category, CategoryId, Coupon, CouponId, CouponKind, Money, Order, OrderId, OrderStatus,
    Product, ProductId, Profile, PromoSection, SectionId, SectionKind, UserId,
};

use crate::cache::{CacheKey, CacheValue};
use crate::fault::Fault;
use crate::shop::Shop;

// =============================================================================
// Write payloads
// =============================================================================

/// Category create/update payload.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInput {
    /// URL-safe handle.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Product create/update payload.
#[derive(Debug, Clone, Serialize)]
pub struct ProductInput {
    /// URL-safe handle.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Long-form description.
    pub description: String,
    /// Base price.
    pub price: Money,
    /// Promotional price, if a discount should run.
    pub discounted_price: Option<Money>,
    /// Owning category.
    pub category_id: Option<CategoryId>,
    /// Primary image URL.
    pub image_url: Option<String>,
    /// Whether the product can be added to carts.
    pub in_stock: bool,
}

/// Coupon create/update payload.
#[derive(Debug, Clone, Serialize)]
pub struct CouponInput {
    /// Code the buyer types at the cart.
    pub code: String,
    /// Discount scheme.
    pub kind: CouponKind,
    /// Expiry timestamp; `None` means no expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the coupon can be applied.
    pub active: bool,
}

/// Promotional section create/update payload.
#[derive(Debug, Clone, Serialize)]
pub struct SectionInput {
    /// Heading shown above the section.
    pub title: String,
    /// Section content.
    pub kind: SectionKind,
    /// Display position (ascending).
    pub position: u32,
    /// Whether the section is shown.
    pub active: bool,
}

impl Shop {
    /// Invalidate every cached catalog slot after a catalog write.
    ///
    /// Listing keys are parametrized by filter, so a targeted key list is
    /// not enough; the predicate form catches them all.
    fn invalidate_catalog(&self) {
        self.cache().invalidate_where(|key| {
            matches!(
                key,
                CacheKey::Product(_)
                    | CacheKey::Products(_)
                    | CacheKey::Categories
                    | CacheKey::Category(_)
            )
        });
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Auth` for non-admin callers, `Fault::Validation` for
    /// a duplicate slug.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn admin_create_category(&self, input: &CategoryInput) -> Result<Category, Fault> {
        let created = self
            .client()
            .post("/admin/categories", json!(input))
            .await?;
        self.invalidate_catalog();
        Ok(created)
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns `Fault::NotFound` for an unknown id.
    #[instrument(skip(self, input), fields(category_id = %category_id))]
    pub async fn admin_update_category(
        &self,
        category_id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, Fault> {
        let path = format!("/admin/categories/{category_id}");
        let updated = self.client().put(&path, json!(input)).await?;
        self.invalidate_catalog();
        Ok(updated)
    }

    /// Delete a category. Products keep existing, uncategorized.
    ///
    /// # Errors
    ///
    /// Returns `Fault::NotFound` for an unknown id.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn admin_delete_category(&self, category_id: &CategoryId) -> Result<(), Fault> {
        let path = format!("/admin/categories/{category_id}");
        self.client().delete::<serde_json::Value>(&path).await?;
        self.invalidate_catalog();
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Validation` for a duplicate slug.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn admin_create_product(&self, input: &ProductInput) -> Result<Product, Fault> {
        let created = self.client().post("/admin/products", json!(input)).await?;
        self.invalidate_catalog();
        Ok(created)
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns `Fault::NotFound` for an unknown id.
    #[instrument(skip(self, input), fields(product_id = %product_id))]
    pub async fn admin_update_product(
        &self,
        product_id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, Fault> {
        let path = format!("/admin/products/{product_id}");
        let updated = self.client().put(&path, json!(input)).await?;
        self.invalidate_catalog();
        Ok(updated)
    }

    /// Delete a product. Existing order lines keep their snapshots.
    ///
    /// # Errors
    ///
    /// Returns `Fault::NotFound` for an unknown id.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn admin_delete_product(&self, product_id: &ProductId) -> Result<(), Fault> {
        let path = format!("/admin/products/{product_id}");
        self.client().delete::<serde_json::Value>(&path).await?;
        self.invalidate_catalog();
        Ok(())
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    /// List all coupons.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Auth` for non-admin callers.
    #[instrument(skip(self))]
    pub async fn admin_coupons(&self) -> Result<Vec<Coupon>, Fault> {
        let client = self.client().clone();
        self.cache()
            .read(CacheKey::Coupons, self.freshness().catalog, || async move {
                let coupons: Vec<Coupon> = client.get("/admin/coupons", &[]).await?;
                Ok(CacheValue::Coupons(coupons))
            })
            .await?
            .into_coupons()
    }

    /// Create a coupon.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Validation` for a duplicate code.
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn admin_create_coupon(&self, input: &CouponInput) -> Result<Coupon, Fault> {
        self.mutate(
            self.client().post("/admin/coupons", json!(input)),
            &[CacheKey::Coupons],
        )
        .await
    }

    /// Update a coupon.
    ///
    /// # Errors
    ///
    /// Returns `Fault::NotFound` for an unknown id.
    #[instrument(skip(self, input), fields(coupon_id = %coupon_id))]
    pub async fn admin_update_coupon(
        &self,
        coupon_id: &CouponId,
        input: &CouponInput,
    ) -> Result<Coupon, Fault> {
        let path = format!("/admin/coupons/{coupon_id}");
        self.mutate(self.client().put(&path, json!(input)), &[CacheKey::Coupons])
            .await
    }

    /// Delete a coupon. Carts that already applied it keep their discount.
    ///
    /// # Errors
    ///
    /// Returns `Fault::NotFound` for an unknown id.
    #[instrument(skip(self), fields(coupon_id = %coupon_id))]
    pub async fn admin_delete_coupon(&self, coupon_id: &CouponId) -> Result<(), Fault> {
        let path = format!("/admin/coupons/{coupon_id}");
        self.mutate(
            self.client().delete::<serde_json::Value>(&path),
            &[CacheKey::Coupons],
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// List all users.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Auth` for non-admin callers.
    #[instrument(skip(self))]
    pub async fn admin_users(&self) -> Result<Vec<Profile>, Fault> {
        let client = self.client().clone();
        self.cache()
            .read(CacheKey::Users, self.freshness().catalog, || async move {
                let users: Vec<Profile> = client.get("/admin/users", &[]).await?;
                Ok(CacheValue::Users(users))
            })
            .await?
            .into_users()
    }

    /// Enable or disable a user account.
    ///
    /// # Errors
    ///
    /// Returns `Fault::NotFound` for an unknown id.
    #[instrument(skip(self), fields(user_id = %user_id, disabled))]
    pub async fn admin_set_user_disabled(
        &self,
        user_id: &UserId,
        disabled: bool,
    ) -> Result<Profile, Fault> {
        let path = format!("/admin/users/{user_id}/disabled");
        let body = json!({ "disabled": disabled });
        self.mutate(self.client().put(&path, body), &[CacheKey::Users])
            .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// List all orders across identities, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Auth` for non-admin callers.
    #[instrument(skip(self))]
    pub async fn admin_orders(&self) -> Result<Vec<Order>, Fault> {
        let client = self.client().clone();
        self.cache()
            .read(CacheKey::AllOrders, self.freshness().catalog, || async move {
                let orders: Vec<Order> = client.get("/admin/orders", &[]).await?;
                Ok(CacheValue::Orders(orders))
            })
            .await?
            .into_orders()
    }

    /// Transition an order's status.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Validation` for an illegal transition (backend
    /// enforces the lifecycle).
    #[instrument(skip(self), fields(order_id = %order_id, status = %status))]
    pub async fn admin_update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, Fault> {
        let path = format!("/admin/orders/{order_id}/status");
        let body = json!({ "status": status });
        self.mutate(self.client().put(&path, body), &[CacheKey::AllOrders])
            .await
    }

    // =========================================================================
    // Promotional sections
    // =========================================================================

    /// Create a home-page section.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Auth` for non-admin callers.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn admin_create_section(&self, input: &SectionInput) -> Result<PromoSection, Fault> {
        self.mutate(
            self.client().post("/admin/sections", json!(input)),
            &[CacheKey::Sections],
        )
        .await
    }

    /// Update a home-page section.
    ///
    /// # Errors
    ///
    /// Returns `Fault::NotFound` for an unknown id.
    #[instrument(skip(self, input), fields(section_id = %section_id))]
    pub async fn admin_update_section(
        &self,
        section_id: &SectionId,
        input: &SectionInput,
    ) -> Result<PromoSection, Fault> {
        let path = format!("/admin/sections/{section_id}");
        self.mutate(self.client().put(&path, json!(input)), &[CacheKey::Sections])
            .await
    }

    /// Delete a home-page section.
    ///
    /// # Errors
    ///
    /// Returns `Fault::NotFound` for an unknown id.
    #[instrument(skip(self), fields(section_id = %section_id))]
    pub async fn admin_delete_section(&self, section_id: &SectionId) -> Result<(), Fault> {
        let path = format!("/admin/sections/{section_id}");
        self.mutate(
            self.client().delete::<serde_json::Value>(&path),
            &[CacheKey::Sections],
        )
        .await?;
        Ok(())
    }
}
