//! Row types read from and written to the store.

use chrono::NaiveDate;
use common::{CustomerId, Money, OrderId, ProductId};

/// A stored customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Field values for inserting or fully replacing a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerData {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A stored product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
}

/// Field values for inserting or fully replacing a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductData {
    pub name: String,
    pub price: Money,
}

/// A stored order, hydrated with its customer's name and its products.
///
/// `total` is the value captured at placement time and is not derived from
/// the current prices in `products`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub order_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub delivery_complete: bool,
    pub order_cancelled: bool,
    pub total: Money,
    /// Products in ascending id order.
    pub products: Vec<Product>,
}

/// A fully computed order ready to be inserted together with its
/// product associations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub order_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub delivery_complete: bool,
    pub total: Money,
    pub product_ids: Vec<ProductId>,
}

/// The two lifecycle flags of an order, as read under a row lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderStatus {
    pub delivery_complete: bool,
    pub order_cancelled: bool,
}
