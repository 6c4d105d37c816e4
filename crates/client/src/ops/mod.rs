//! Typed operations on [`crate::Shop`], grouped by surface.
//!
//! - [`catalog`] - products, categories, home-page sections (cached reads)
//! - [`cart`] - the identity-scoped cart and its mutations
//! - [`account`] - registration, login/logout, profile
//! - [`orders`] - checkout and order history
//! - [`reviews`] - product reviews and rating aggregates
//! - [`admin`] - administrative CRUD over the same mutation-invalidate core

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod reviews;

pub use account::LoginResponse;
pub use admin::{CategoryInput, CouponInput, ProductInput, SectionInput};
pub use reviews::NewReview;
