//! Catalog reads: products, categories, promotional sections.
//!
//! All reads flow through the cache under the catalog freshness window.
//! Search results are cached per filter; when the backend ignores the search
//! term (older deployments), the fetched page is filtered client-side before
//! it enters the cache.

use tracing::{debug, instrument};

use larkspur_core::{Category, Page, Product, ProductFilter, PromoSection};

use crate::cache::{CacheKey, CacheValue};
use crate::fault::Fault;
use crate::shop::Shop;

impl Shop {
    /// Get a page of products matching the filter.
    ///
    /// # Errors
    ///
    /// Returns a fault if the backend call fails and no cached page exists.
    #[instrument(skip(self, filter))]
    pub async fn products(&self, filter: &ProductFilter) -> Result<Page<Product>, Fault> {
        let key = CacheKey::Products(filter_key(filter));
        let client = self.client().clone();
        let filter = filter.clone();
        self.cache()
            .read(key, self.freshness().catalog, || async move {
                let query = filter_query(&filter);
                let mut page: Page<Product> = client.get("/products", &query).await?;

                // Fallback for backends that echo an unfiltered listing: drop
                // non-matching items before the page enters the cache.
                if filter.search.is_some() {
                    let before = page.items.len();
                    page.items.retain(|p| filter.matches(p));
                    if page.items.len() < before {
                        debug!(
                            dropped = before - page.items.len(),
                            "applied client-side search fallback"
                        );
                    }
                }
                Ok(CacheValue::Products(page))
            })
            .await?
            .into_products()
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `Fault::NotFound` if no such product exists.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn product(&self, slug: &str) -> Result<Product, Fault> {
        let key = CacheKey::Product(slug.to_string());
        let client = self.client().clone();
        let path = format!("/products/{slug}");
        self.cache()
            .read(key, self.freshness().catalog, || async move {
                let product: Product = client.get(&path, &[]).await?;
                Ok(CacheValue::Product(Box::new(product)))
            })
            .await?
            .into_product()
    }

    /// Get all categories.
    ///
    /// # Errors
    ///
    /// Returns a fault if the backend call fails and no cached list exists.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, Fault> {
        let client = self.client().clone();
        self.cache()
            .read(CacheKey::Categories, self.freshness().catalog, || async move {
                let categories: Vec<Category> = client.get("/categories", &[]).await?;
                Ok(CacheValue::Categories(categories))
            })
            .await?
            .into_categories()
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns `Fault::NotFound` if no such category exists.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn category(&self, slug: &str) -> Result<Category, Fault> {
        let key = CacheKey::Category(slug.to_string());
        let client = self.client().clone();
        let path = format!("/categories/{slug}");
        self.cache()
            .read(key, self.freshness().catalog, || async move {
                let category: Category = client.get(&path, &[]).await?;
                Ok(CacheValue::Category(Box::new(category)))
            })
            .await?
            .into_category()
    }

    /// Get the active promotional home-page sections, in display order.
    ///
    /// # Errors
    ///
    /// Returns a fault if the backend call fails and no cached list exists.
    #[instrument(skip(self))]
    pub async fn home_sections(&self) -> Result<Vec<PromoSection>, Fault> {
        let client = self.client().clone();
        self.cache()
            .read(CacheKey::Sections, self.freshness().sections, || async move {
                let mut sections: Vec<PromoSection> = client.get("/sections", &[]).await?;
                sections.retain(|s| s.active);
                sections.sort_by_key(|s| s.position);
                Ok(CacheValue::Sections(sections))
            })
            .await?
            .into_sections()
    }
}

/// Canonical cache-key string for a filter.
///
/// Distinct filters must map to distinct keys; formatting every field keeps
/// that property without inventing an equality scheme.
fn filter_key(filter: &ProductFilter) -> String {
    format!(
        "q={:?}:cat={:?}:sort={}:page={}:per={}",
        filter.search,
        filter.category.as_ref().map(larkspur_core::CategoryId::as_str),
        filter.sort.as_query_value(),
        filter.page.unwrap_or(1),
        filter.per_page.unwrap_or(24),
    )
}

/// Query parameters for the product listing endpoint.
fn filter_query(filter: &ProductFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(search) = &filter.search {
        query.push(("q", search.clone()));
    }
    if let Some(category) = &filter.category {
        query.push(("category", category.as_str().to_string()));
    }
    query.push(("sort", filter.sort.as_query_value().to_string()));
    if let Some(page) = filter.page {
        query.push(("page", page.to_string()));
    }
    if let Some(per_page) = filter.per_page {
        query.push(("per_page", per_page.to_string()));
    }
    query
}
