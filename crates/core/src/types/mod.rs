//! Newtype wrappers for type-safe IDs and money values.

mod id;
mod money;

pub use id::*;
pub use money::{CurrencyCode, Money};
