//! Domain layer for the storefront API.
//!
//! This crate provides:
//! - Request validation producing per-field error messages
//! - Customer and product services over the store
//! - The order workflow: delivery scheduling, totals and cancellation

pub mod customer;
pub mod delivery;
pub mod error;
pub mod order;
pub mod product;
pub mod validation;

pub use customer::{CustomerService, CustomerWithOrders, parse_customer};
pub use delivery::{
    Clock, DELIVERY_OFFSET_DAYS, Delivery, DeliveryPolicy, DeliveryRng, FixedClock, FixedOffset,
    NO_DELIVERY_WEEKDAY, SeededRng, SystemClock, SystemRng, delivery_date,
};
pub use error::DomainError;
pub use order::{
    CancelOutcome, OrderError, OrderService, OrderState, PlaceOrder, PlacedOrder, parse_place_order,
};
pub use product::{ProductService, parse_product};
pub use validation::{FieldReader, ValidationErrors};
