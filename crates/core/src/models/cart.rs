//! Cart model and derived totals.
//!
//! The cart itself is owned by the backend and addressed by the caller's
//! session id; this module only models the returned state and the derived
//! aggregate computations (line totals, subtotal, coupon-adjusted total).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::coupon::AppliedCoupon;
use crate::types::{CartLineId, Money, ProductId};

/// Product data embedded in a cart line.
///
/// A deliberately small projection of [`crate::models::Product`]: enough to
/// render the line and compute totals without a second catalog fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartProduct {
    /// Backend product ID.
    pub id: ProductId,
    /// URL-safe handle.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Base price at the time the line was created.
    pub price: Money,
    /// Promotional price, when a discount was running.
    pub discounted_price: Option<Money>,
    /// Primary image URL.
    pub image_url: Option<String>,
}

impl CartProduct {
    /// The unit price charged for this line: discounted when present,
    /// base otherwise.
    #[must_use]
    pub fn unit_price(&self) -> Money {
        self.discounted_price.unwrap_or(self.price)
    }
}

/// A single line in a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Backend line ID (stable across quantity updates).
    pub id: CartLineId,
    /// Product snapshot for this line.
    pub product: CartProduct,
    /// Quantity, always >= 1. A line at quantity zero does not exist;
    /// removal is a distinct operation.
    pub quantity: u32,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.product.unit_price().times(self.quantity)
    }
}

/// The caller's cart as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Cart lines, in insertion order.
    pub lines: Vec<CartLine>,
    /// Coupon applied to the cart, if any.
    pub coupon: Option<AppliedCoupon>,
}

impl Cart {
    /// An empty cart (what a fresh session sees before its first add).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            lines: Vec::new(),
            coupon: None,
        }
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total unit count across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of line totals before any coupon.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        let currency = self
            .lines
            .first()
            .map(|l| l.product.price.currency_code)
            .unwrap_or_default();
        self.lines
            .iter()
            .fold(Money::zero(currency), |acc, line| acc.plus(&line.line_total()))
    }

    /// Subtotal minus the applied coupon's discount, floored at zero.
    #[must_use]
    pub fn total(&self) -> Money {
        let subtotal = self.subtotal();
        match &self.coupon {
            None => subtotal,
            Some(coupon) => {
                let amount = (subtotal.amount - coupon.discount.amount).max(Decimal::ZERO);
                Money::new(amount, subtotal.currency_code)
            }
        }
    }
}
