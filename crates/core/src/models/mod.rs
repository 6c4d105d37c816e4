//! Domain models shared between the client SDK and the CLI.
//!
//! These types double as wire DTOs: the backend speaks snake_case JSON that
//! matches the serde defaults here, so no separate conversion layer exists.

mod cart;
mod catalog;
mod coupon;
mod order;
mod promo;
mod review;
mod user;

pub use cart::{Cart, CartLine, CartProduct};
pub use catalog::{Category, Page, PageInfo, Product, ProductFilter, ProductSort};
pub use coupon::{AppliedCoupon, Coupon, CouponKind};
pub use order::{Order, OrderLine, OrderStatus, ShippingAddress};
pub use promo::{PromoSection, SectionKind};
pub use review::{RatingSummary, Review};
pub use user::{Credentials, Profile, Registration, Role};
