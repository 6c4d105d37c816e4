//! Catalog models: products, categories, and pagination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Money, ProductId};

// =============================================================================
// Products
// =============================================================================

/// A storefront product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Backend product ID.
    pub id: ProductId,
    /// URL-safe handle (e.g., "aeropress-filter-pack").
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Long-form description (plain text).
    #[serde(default)]
    pub description: String,
    /// Base price.
    pub price: Money,
    /// Promotional price, when a discount is running.
    pub discounted_price: Option<Money>,
    /// Owning category, if the product is categorized.
    pub category_id: Option<CategoryId>,
    /// Primary image URL.
    pub image_url: Option<String>,
    /// Whether the product can currently be added to a cart.
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

const fn default_in_stock() -> bool {
    true
}

impl Product {
    /// The price a buyer actually pays: discounted price when present,
    /// base price otherwise.
    #[must_use]
    pub fn effective_price(&self) -> Money {
        self.discounted_price.unwrap_or(self.price)
    }
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Backend category ID.
    pub id: CategoryId,
    /// URL-safe handle.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Optional description shown on the category page.
    pub description: Option<String>,
}

// =============================================================================
// Pagination
// =============================================================================

/// Pagination metadata returned alongside list results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-based page number.
    pub page: u32,
    /// Page size requested.
    pub per_page: u32,
    /// Total matching items across all pages.
    pub total_items: u64,
}

impl PageInfo {
    /// Whether another page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page as u64) * (self.per_page as u64) < self.total_items
    }
}

/// A page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Pagination metadata.
    pub page_info: PageInfo,
}

// =============================================================================
// Filtering
// =============================================================================

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    /// Newest first.
    #[default]
    Newest,
    /// Cheapest first (by effective price).
    PriceAsc,
    /// Most expensive first (by effective price).
    PriceDesc,
    /// Alphabetical by title.
    TitleAsc,
}

impl ProductSort {
    /// Query-parameter value understood by the backend.
    #[must_use]
    pub const fn as_query_value(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::TitleAsc => "title_asc",
        }
    }
}

/// Filter for product listings.
///
/// Sent to the backend as query parameters; also applied locally as a
/// fallback when the backend echoes an unfiltered result for a search term
/// (older backend deployments ignore `q`).
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Free-text search over title and description.
    pub search: Option<String>,
    /// Restrict to a category.
    pub category: Option<CategoryId>,
    /// Sort order.
    pub sort: ProductSort,
    /// 1-based page number (backend default: 1).
    pub page: Option<u32>,
    /// Page size (backend default: 24).
    pub per_page: Option<u32>,
}

impl ProductFilter {
    /// Whether a product satisfies the search term and category constraint.
    ///
    /// Used for client-side fallback filtering over a fetched page.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category
            && product.category_id.as_ref() != Some(category)
        {
            return false;
        }
        match &self.search {
            None => true,
            Some(term) => {
                let needle = term.to_lowercase();
                product.title.to_lowercase().contains(&needle)
                    || product.description.to_lowercase().contains(&needle)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::types::CurrencyCode;

    fn product(title: &str, cents: i64, discount_cents: Option<i64>) -> Product {
        Product {
            id: ProductId::new("p_1"),
            slug: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            description: String::new(),
            price: Money::new(Decimal::new(cents, 2), CurrencyCode::USD),
            discounted_price: discount_cents
                .map(|c| Money::new(Decimal::new(c, 2), CurrencyCode::USD)),
            category_id: None,
            image_url: None,
            in_stock: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_price_prefers_discount() {
        let p = product("Kettle", 4000, Some(2999));
        assert_eq!(p.effective_price().amount, Decimal::new(2999, 2));
        let p = product("Kettle", 4000, None);
        assert_eq!(p.effective_price().amount, Decimal::new(4000, 2));
    }

    #[test]
    fn test_filter_matches_title_case_insensitive() {
        let filter = ProductFilter {
            search: Some("KETTLE".to_string()),
            ..ProductFilter::default()
        };
        assert!(filter.matches(&product("Gooseneck Kettle", 4000, None)));
        assert!(!filter.matches(&product("French Press", 3000, None)));
    }

    #[test]
    fn test_filter_category_constraint() {
        let mut p = product("Kettle", 4000, None);
        p.category_id = Some(CategoryId::new("c_brew"));
        let filter = ProductFilter {
            category: Some(CategoryId::new("c_grind")),
            ..ProductFilter::default()
        };
        assert!(!filter.matches(&p));
    }

    #[test]
    fn test_page_info_has_next() {
        let info = PageInfo {
            page: 1,
            per_page: 24,
            total_items: 25,
        };
        assert!(info.has_next());
        let info = PageInfo {
            page: 2,
            per_page: 24,
            total_items: 25,
        };
        assert!(!info.has_next());
    }
}
