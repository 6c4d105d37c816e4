//! CLI command implementations, grouped by surface.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod orders;
