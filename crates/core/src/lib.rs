//! Larkspur Core - Shared domain types.
//!
//! This crate provides the domain model used across all Larkspur components:
//! - `client` - SDK for the remote storefront/admin REST backend
//! - `cli` - Command-line storefront and admin tooling
//!
//! # Architecture
//!
//! The core crate contains only types and derived computations - no I/O, no
//! HTTP clients, no persistence. Wire DTOs and domain types are the same
//! structs; the backend speaks snake_case JSON matching the serde defaults
//! used here.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and money
//! - [`models`] - Catalog, cart, order, review, coupon, and promo models

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
