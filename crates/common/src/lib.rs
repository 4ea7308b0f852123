//! Shared types for the storefront API.
//!
//! Identifiers and money live here so the store, domain and HTTP layers
//! agree on them without depending on each other.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{CustomerId, OrderId, ProductId};
