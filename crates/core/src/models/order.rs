//! Order models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Money, OrderId, ProductId};

/// Fulfillment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, payment not yet confirmed.
    Pending,
    /// Payment confirmed.
    Paid,
    /// Handed to the carrier.
    Shipped,
    /// Delivered to the buyer.
    Delivered,
    /// Cancelled before shipment.
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

/// A line on a placed order (immutable snapshot of a cart line).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product the line was created from.
    pub product_id: ProductId,
    /// Product title at order time.
    pub title: String,
    /// Unit price charged.
    pub unit_price: Money,
    /// Quantity ordered.
    pub quantity: u32,
}

/// Shipping address collected at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Recipient name.
    pub name: String,
    /// Street address.
    pub street: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub postal_code: String,
    /// ISO country code.
    pub country: String,
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Backend order ID.
    pub id: OrderId,
    /// Order lines.
    pub lines: Vec<OrderLine>,
    /// Total charged, including any coupon discount.
    pub total: Money,
    /// Current status.
    pub status: OrderStatus,
    /// Shipping destination.
    pub shipping_address: ShippingAddress,
    /// Placement timestamp.
    pub placed_at: DateTime<Utc>,
}
