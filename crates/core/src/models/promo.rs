//! Promotional home-page section models (admin-managed).

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, ProductId, SectionId};

/// Rendering style of a promotional section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Full-width banner linking to a single product or category.
    HeroBanner {
        /// Banner image URL.
        image_url: String,
        /// Destination path (e.g., "/products/kettle").
        link: String,
    },
    /// Horizontal strip of featured products.
    ProductStrip {
        /// Products to feature, in display order.
        product_ids: Vec<ProductId>,
    },
    /// Grid of category tiles.
    CategoryGrid {
        /// Categories to show, in display order.
        category_ids: Vec<CategoryId>,
    },
}

/// An admin-managed home-page section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoSection {
    /// Backend section ID.
    pub id: SectionId,
    /// Heading shown above the section.
    pub title: String,
    /// Section content.
    pub kind: SectionKind,
    /// Display position on the home page (ascending).
    pub position: u32,
    /// Whether the section is currently shown.
    pub active: bool,
}
