//! The place-order request.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde_json::Value;
use store::{CustomerId, ProductId};

use super::OrderError;
use crate::error::DomainError;
use crate::validation::FieldReader;

/// Fields accepted in an order body. Only `customer_id`, `order_date` and
/// `products` are read; the rest are derived and ignored on input.
const ORDER_FIELDS: &[&str] = &[
    "order_id",
    "customer_id",
    "customer_name",
    "order_date",
    "delivery_date",
    "delivery_complete",
    "products",
    "order_total",
    "order_cancelled",
];

/// A validated request to place an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrder {
    pub customer_id: CustomerId,
    pub order_date: NaiveDate,
    /// Product ids in the order supplied by the client, each at most once.
    pub product_ids: Vec<ProductId>,
}

impl PlaceOrder {
    pub fn new(
        customer_id: CustomerId,
        order_date: NaiveDate,
        product_ids: impl IntoIterator<Item = ProductId>,
    ) -> Self {
        Self {
            customer_id,
            order_date,
            product_ids: product_ids.into_iter().collect(),
        }
    }
}

/// Validates an order body.
///
/// An explicitly empty `products` list is rejected with
/// [`OrderError::NoProducts`] before any other field is looked at. A product
/// id may appear only once per order since the association carries no
/// quantity.
pub fn parse_place_order(body: &Value) -> Result<PlaceOrder, DomainError> {
    if let Some(products) = body.get("products").and_then(Value::as_array)
        && products.is_empty()
    {
        return Err(OrderError::NoProducts.into());
    }

    let mut reader = FieldReader::new(body, ORDER_FIELDS);
    let customer_id = reader.required_integer("customer_id");
    let order_date = reader.required_date("order_date");
    let products = reader.required_integer_list("products");

    if let Some(ids) = &products {
        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(*id) {
                reader.error("products", format!("Duplicate product id {id}."));
            }
        }
    }

    match (customer_id, order_date, products) {
        (Some(customer_id), Some(order_date), Some(products)) if reader.is_clean() => {
            Ok(PlaceOrder::new(
                CustomerId::new(customer_id),
                order_date,
                products.into_iter().map(ProductId::new),
            ))
        }
        _ => Err(reader.into_errors().into()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::validation::MISSING;

    #[test]
    fn test_parse_valid_order() {
        let body = json!({
            "customer_id": 1,
            "order_date": "2024-01-01",
            "products": [10, 11]
        });

        let cmd = parse_place_order(&body).unwrap();
        assert_eq!(cmd.customer_id, CustomerId::new(1));
        assert_eq!(cmd.order_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(cmd.product_ids, vec![ProductId::new(10), ProductId::new(11)]);
    }

    #[test]
    fn test_empty_products_is_rejected_before_validation() {
        let body = json!({ "customer_id": "nope", "products": [] });

        let err = parse_place_order(&body).unwrap_err();
        assert!(matches!(err, DomainError::Order(OrderError::NoProducts)));
    }

    #[test]
    fn test_all_field_problems_are_reported_together() {
        let body = json!({ "customer_id": "one", "order_date": "tomorrow" });

        let DomainError::Validation(errors) = parse_place_order(&body).unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(errors.messages("customer_id"), ["Not a valid integer."]);
        assert_eq!(errors.messages("order_date"), ["Not a valid date."]);
        assert_eq!(errors.messages("products"), [MISSING]);
    }

    #[test]
    fn test_duplicate_products_are_rejected() {
        let body = json!({
            "customer_id": 1,
            "order_date": "2024-01-01",
            "products": [10, 11, 10]
        });

        let DomainError::Validation(errors) = parse_place_order(&body).unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(errors.messages("products"), ["Duplicate product id 10."]);
    }

    #[test]
    fn test_derived_fields_are_ignored_on_input() {
        let body = json!({
            "customer_id": 1,
            "order_date": "2024-01-01",
            "delivery_date": "2030-01-01",
            "order_total": 0,
            "products": [3]
        });

        assert!(parse_place_order(&body).is_ok());
    }
}
