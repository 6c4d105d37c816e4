//! Coupon models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CouponId, Money};

/// Discount scheme for a coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// Percentage off the cart subtotal (e.g., 15 for 15%).
    Percent(Decimal),
    /// Fixed amount off the cart subtotal.
    Fixed(Money),
}

/// An admin-managed coupon definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    /// Backend coupon ID.
    pub id: CouponId,
    /// Code the buyer types at the cart (e.g., "WELCOME10").
    pub code: String,
    /// Discount scheme.
    pub kind: CouponKind,
    /// Expiry timestamp; `None` means no expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the coupon can currently be applied.
    pub active: bool,
}

/// A coupon as applied to a cart.
///
/// The backend resolves the scheme to a concrete discount amount at
/// application time, so the client never re-derives percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedCoupon {
    /// The applied code.
    pub code: String,
    /// Concrete discount amount against the cart subtotal.
    pub discount: Money,
}
