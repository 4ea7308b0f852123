//! Order placement and cancellation.

mod command;
mod service;
mod state;

pub use command::{PlaceOrder, parse_place_order};
pub use service::{OrderService, PlacedOrder};
pub use state::{CancelOutcome, OrderState};

use store::OrderId;
use thiserror::Error;

/// Business rules an order request can violate.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order has no products.
    #[error("Cannot place order without products")]
    NoProducts,

    /// Delivered orders are final.
    #[error("Order {order_id} has already been delivered. It cannot be cancelled.")]
    AlreadyDelivered { order_id: OrderId },
}
