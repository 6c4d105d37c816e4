//! Larkspur client SDK.
//!
//! # Architecture
//!
//! The backend is the source of truth - no local sync, direct REST calls.
//! Every call is made on behalf of an identity: a guest (anonymous session id
//! persisted in the profile store) or an authenticated user (bearer token
//! persisted alongside the same session id). Reads flow through a keyed
//! response cache with per-resource freshness windows; writes flow through a
//! mutation coordinator that marks the affected cache keys stale only after
//! the backend confirms success.
//!
//! # Layers
//!
//! - [`identity`] - session-id/token resolution over a pluggable profile store
//! - [`http`] - request assembly, the identity header contract, fault mapping
//! - [`cache`] - keyed slots with coalesced reads and stale-while-error
//! - [`shop`] - the top-level [`Shop`] client and its typed operations
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use larkspur_client::{ClientConfig, Shop};
//! use larkspur_client::identity::FileProfileStore;
//!
//! let config = ClientConfig::from_env()?;
//! let store = Arc::new(FileProfileStore::open(&config.profile_path)?);
//! let shop = Shop::new(&config, store)?;
//!
//! let page = shop.products(&Default::default()).await?;
//! let cart = shop.add_to_cart(&page.items[0].id, 1).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod fault;
pub mod http;
pub mod identity;
pub mod ops;
pub mod shop;

pub use cache::{CacheKey, SlotState, SlotStatus};
pub use config::{ClientConfig, ConfigError, Freshness};
pub use fault::Fault;
pub use identity::{Identity, IdentityKind, IdentityVault, ProfileStore};
pub use shop::Shop;
