//! HTTP handlers grouped by resource.

pub mod customers;
pub mod health;
pub mod home;
pub mod metrics;
pub mod orders;
pub mod products;

use domain::{CustomerService, OrderService, ProductService};
use store::Store;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub customers: CustomerService<S>,
    pub products: ProductService<S>,
    pub orders: OrderService<S>,
}

/// Parses an integer `{id}` path segment.
pub(crate) fn parse_id<T: From<i64>>(raw: &str) -> Result<T, ApiError> {
    raw.parse::<i64>()
        .map(T::from)
        .map_err(|_| ApiError::BadRequest(format!("Invalid id: {raw}")))
}

#[cfg(test)]
mod tests {
    use store::CustomerId;

    use super::*;

    #[test]
    fn test_parse_id() {
        let id: CustomerId = parse_id("42").unwrap();
        assert_eq!(id, CustomerId::new(42));
        assert!(matches!(
            parse_id::<CustomerId>("abc"),
            Err(ApiError::BadRequest(msg)) if msg == "Invalid id: abc"
        ));
        assert!(parse_id::<CustomerId>("1.5").is_err());
    }
}
