use async_trait::async_trait;

use crate::{
    Customer, CustomerData, CustomerId, NewOrder, Order, OrderId, OrderStatus, Product,
    ProductData, ProductId, Result,
};

/// Core trait for store implementations.
///
/// Every method here is a single statement against the underlying store.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns every customer in id order.
    async fn list_customers(&self) -> Result<Vec<Customer>>;

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>>;

    /// Returns customers whose name contains `keyword`, ordered by name.
    ///
    /// `%` and `_` in the keyword are matched literally.
    async fn search_customers(&self, keyword: &str) -> Result<Vec<Customer>>;

    async fn insert_customer(&self, data: CustomerData) -> Result<Customer>;

    /// Replaces all fields of a customer.
    ///
    /// Returns None if the customer doesn't exist.
    async fn update_customer(&self, id: CustomerId, data: CustomerData)
    -> Result<Option<Customer>>;

    /// Deletes a customer.
    ///
    /// Returns false if the customer doesn't exist, and
    /// `StoreError::Integrity` if orders still reference it.
    async fn delete_customer(&self, id: CustomerId) -> Result<bool>;

    /// Returns every product in id order.
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Returns products whose name contains `keyword`, ordered by name.
    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>>;

    async fn insert_product(&self, data: ProductData) -> Result<Product>;

    /// Replaces all fields of a product.
    ///
    /// Returns None if the product doesn't exist.
    async fn update_product(&self, id: ProductId, data: ProductData) -> Result<Option<Product>>;

    /// Deletes a product.
    ///
    /// Returns false if the product doesn't exist, and
    /// `StoreError::Integrity` if orders still reference it.
    async fn delete_product(&self, id: ProductId) -> Result<bool>;

    /// Returns every order in id order.
    async fn list_orders(&self) -> Result<Vec<Order>>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns the orders placed by any of the given customers, in id order.
    async fn orders_for_customers(&self, ids: &[CustomerId]) -> Result<Vec<Order>>;

    /// Starts a transaction.
    ///
    /// Dropping the returned unit of work without calling
    /// [`UnitOfWork::commit`] rolls back everything written through it.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;
}

/// A transaction over the store.
///
/// Reads through a unit of work lock the rows they return until commit or
/// rollback, so a check followed by a write cannot interleave with another
/// writer.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Returns true if the customer exists, holding it against deletion.
    async fn customer_exists(&mut self, id: CustomerId) -> Result<bool>;

    /// Looks up a product, holding it against deletion or repricing.
    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>>;

    /// Reads an order's lifecycle flags, locking the row for update.
    async fn lock_order(&mut self, id: OrderId) -> Result<Option<OrderStatus>>;

    /// Inserts an order and its product associations.
    async fn insert_order(&mut self, order: NewOrder) -> Result<OrderId>;

    /// Sets `order_cancelled` on an order previously read with
    /// [`UnitOfWork::lock_order`].
    async fn mark_order_cancelled(&mut self, id: OrderId) -> Result<()>;

    /// Commits every write made through this unit of work.
    async fn commit(self: Box<Self>) -> Result<()>;
}
