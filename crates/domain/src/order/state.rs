//! Order lifecycle derived from the delivery and cancellation flags.

use store::{OrderId, OrderStatus};

use super::OrderError;

/// The lifecycle state of an order.
///
/// State transitions:
/// ```text
/// Open ──► Cancelled
///
/// Delivered (set at placement when the delivery date has passed)
/// ```
/// Delivery takes precedence: an order flagged both delivered and cancelled
/// is treated as delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderState {
    /// Not delivered, not cancelled.
    Open,

    /// Delivery completed (terminal state).
    Delivered,

    /// Order was cancelled (terminal state).
    Cancelled,
}

/// What a cancel request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The order moved from open to cancelled.
    Cancelled,
    /// The order was already cancelled; nothing changed.
    AlreadyCancelled,
}

impl OrderState {
    pub fn from_flags(delivery_complete: bool, order_cancelled: bool) -> Self {
        if delivery_complete {
            OrderState::Delivered
        } else if order_cancelled {
            OrderState::Cancelled
        } else {
            OrderState::Open
        }
    }

    /// Decides the outcome of cancelling an order in this state.
    pub fn cancel(&self, order_id: OrderId) -> Result<CancelOutcome, OrderError> {
        match self {
            OrderState::Open => Ok(CancelOutcome::Cancelled),
            OrderState::Cancelled => Ok(CancelOutcome::AlreadyCancelled),
            OrderState::Delivered => Err(OrderError::AlreadyDelivered { order_id }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Open => "Open",
            OrderState::Delivered => "Delivered",
            OrderState::Cancelled => "Cancelled",
        }
    }
}

impl From<OrderStatus> for OrderState {
    fn from(status: OrderStatus) -> Self {
        Self::from_flags(status.delivery_complete, status.order_cancelled)
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
