//! Version 1 response shapes.
//!
//! Field order matches the documented JSON layout. Money is rendered as a
//! decimal number and dates as `YYYY-MM-DD`.

use chrono::NaiveDate;
use domain::{CustomerWithOrders, PlacedOrder};
use serde::Serialize;
use store::{Customer, Order, Product};

#[derive(Debug, Serialize)]
pub struct ProductView {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.as_i64(),
            name: product.name.clone(),
            price: product.price.to_decimal(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub order_id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub order_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub delivery_complete: bool,
    pub products: Vec<ProductView>,
    pub order_total: f64,
    pub order_cancelled: bool,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.as_i64(),
            customer_id: order.customer_id.as_i64(),
            customer_name: order.customer_name.clone(),
            order_date: order.order_date,
            delivery_date: order.delivery_date,
            delivery_complete: order.delivery_complete,
            products: order.products.iter().map(ProductView::from).collect(),
            order_total: order.total.to_decimal(),
            order_cancelled: order.order_cancelled,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerView {
    pub customer_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub orders: Vec<OrderView>,
}

impl From<&CustomerWithOrders> for CustomerView {
    fn from(entry: &CustomerWithOrders) -> Self {
        let Customer {
            id,
            name,
            email,
            phone,
        } = &entry.customer;
        Self {
            customer_id: id.as_i64(),
            name: name.clone(),
            email: email.clone(),
            phone: phone.clone(),
            orders: entry.orders.iter().map(OrderView::from).collect(),
        }
    }
}

/// Confirmation returned by create, update and delete requests.
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub message: String,
    #[serde(flatten)]
    pub id: Option<CreatedId>,
}

/// Generated id of a newly created entity, keyed by its id field name.
#[derive(Debug, Serialize)]
pub enum CreatedId {
    #[serde(rename = "customer_id")]
    Customer(i64),
    #[serde(rename = "product_id")]
    Product(i64),
}

impl MessageView {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: None,
        }
    }

    pub fn with_id(message: impl Into<String>, id: CreatedId) -> Self {
        Self {
            message: message.into(),
            id: Some(id),
        }
    }
}

/// Confirmation returned when an order is placed.
#[derive(Debug, Serialize)]
pub struct OrderPlacedView {
    pub message: &'static str,
    pub order_id: i64,
    pub delivery_date: NaiveDate,
    pub delivery_complete: bool,
    pub order_total: f64,
}

impl From<&PlacedOrder> for OrderPlacedView {
    fn from(placed: &PlacedOrder) -> Self {
        Self {
            message: "New Order Added Successfully",
            order_id: placed.order_id.as_i64(),
            delivery_date: placed.delivery_date,
            delivery_complete: placed.delivery_complete,
            order_total: placed.total.to_decimal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use store::{CustomerId, Money, OrderId, ProductId};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn order() -> Order {
        Order {
            id: OrderId::new(3),
            customer_id: CustomerId::new(1),
            customer_name: "Ada".to_string(),
            order_date: date(2024, 1, 1),
            delivery_date: date(2024, 1, 6),
            delivery_complete: false,
            order_cancelled: false,
            total: Money::from_cents(2499),
            products: vec![
                Product {
                    id: ProductId::new(10),
                    name: "Widget".to_string(),
                    price: Money::from_cents(1999),
                },
                Product {
                    id: ProductId::new(11),
                    name: "Gadget".to_string(),
                    price: Money::from_cents(500),
                },
            ],
        }
    }

    #[test]
    fn test_order_field_order() {
        let json = serde_json::to_string(&OrderView::from(&order())).unwrap();
        let keys = [
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
        let positions: Vec<usize> = keys
            .iter()
            .map(|key| json.find(&format!("\"{key}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    }

    #[test]
    fn test_order_values() {
        let json = serde_json::to_value(OrderView::from(&order())).unwrap();
        assert_eq!(json["order_date"], "2024-01-01");
        assert_eq!(json["delivery_date"], "2024-01-06");
        assert_eq!(json["order_total"], 24.99);
        assert_eq!(json["products"][0]["price"], 19.99);
        assert_eq!(json["products"][1]["product_id"], 11);
    }

    #[test]
    fn test_customer_embeds_orders() {
        let entry = CustomerWithOrders {
            customer: Customer {
                id: CustomerId::new(1),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: "555-0100".to_string(),
            },
            orders: vec![order()],
        };
        let json = serde_json::to_value(CustomerView::from(&entry)).unwrap();
        assert_eq!(json["customer_id"], 1);
        assert_eq!(json["orders"][0]["order_id"], 3);
    }

    #[test]
    fn test_message_with_id() {
        let json = serde_json::to_value(MessageView::with_id(
            "New Customer Added Successfully",
            CreatedId::Customer(7),
        ))
        .unwrap();
        assert_eq!(json["message"], "New Customer Added Successfully");
        assert_eq!(json["customer_id"], 7);

        let json = serde_json::to_value(MessageView::new("Order Cancelled")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "Order Cancelled" }));
    }
}
