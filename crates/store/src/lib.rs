//! Relational store for the storefront API.
//!
//! The [`Store`] trait covers single-statement reads and writes; anything
//! that must read and then write atomically goes through a [`UnitOfWork`]
//! obtained from [`Store::begin`].

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use common::{CustomerId, Money, OrderId, ProductId};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use model::{Customer, CustomerData, NewOrder, Order, OrderStatus, Product, ProductData};
pub use postgres::PostgresStore;
pub use store::{Store, UnitOfWork};
