use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::{
    Customer, CustomerData, CustomerId, Money, NewOrder, Order, OrderId, OrderStatus, Product,
    ProductData, ProductId, Result, StoreError,
    store::{Store, UnitOfWork},
};

#[derive(Debug, Clone)]
struct OrderRow {
    customer_id: CustomerId,
    order_date: NaiveDate,
    delivery_date: NaiveDate,
    delivery_complete: bool,
    order_cancelled: bool,
    total: Money,
    product_ids: BTreeSet<ProductId>,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    customers: BTreeMap<CustomerId, Customer>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, OrderRow>,
    last_customer_id: i64,
    last_product_id: i64,
    last_order_id: i64,
}

impl Tables {
    fn hydrate(&self, id: OrderId, row: &OrderRow) -> Order {
        Order {
            id,
            customer_id: row.customer_id,
            customer_name: self
                .customers
                .get(&row.customer_id)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            order_date: row.order_date,
            delivery_date: row.delivery_date,
            delivery_complete: row.delivery_complete,
            order_cancelled: row.order_cancelled,
            total: row.total,
            products: row
                .product_ids
                .iter()
                .filter_map(|product_id| self.products.get(product_id).cloned())
                .collect(),
        }
    }

    fn is_customer_referenced(&self, id: CustomerId) -> bool {
        self.orders.values().any(|o| o.customer_id == id)
    }

    fn is_product_referenced(&self, id: ProductId) -> bool {
        self.orders.values().any(|o| o.product_ids.contains(&id))
    }
}

/// In-memory store implementation for tests and database-less runs.
///
/// Provides the same interface and the same referential-integrity rules as
/// the PostgreSQL implementation. Name search is case-sensitive.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn list_customers(&self) -> Result<Vec<Customer>> {
        let tables = self.tables.read().await;
        Ok(tables.customers.values().cloned().collect())
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let tables = self.tables.read().await;
        Ok(tables.customers.get(&id).cloned())
    }

    async fn search_customers(&self, keyword: &str) -> Result<Vec<Customer>> {
        let tables = self.tables.read().await;
        let mut matches: Vec<_> = tables
            .customers
            .values()
            .filter(|c| c.name.contains(keyword))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(matches)
    }

    async fn insert_customer(&self, data: CustomerData) -> Result<Customer> {
        let mut tables = self.tables.write().await;
        tables.last_customer_id += 1;
        let customer = Customer {
            id: CustomerId::new(tables.last_customer_id),
            name: data.name,
            email: data.email,
            phone: data.phone,
        };
        tables.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        data: CustomerData,
    ) -> Result<Option<Customer>> {
        let mut tables = self.tables.write().await;
        let Some(customer) = tables.customers.get_mut(&id) else {
            return Ok(None);
        };
        customer.name = data.name;
        customer.email = data.email;
        customer.phone = data.phone;
        Ok(Some(customer.clone()))
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.customers.contains_key(&id) {
            return Ok(false);
        }
        if tables.is_customer_referenced(id) {
            return Err(StoreError::Integrity {
                entity: "Customer",
                id: id.as_i64(),
            });
        }
        tables.customers.remove(&id);
        Ok(true)
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.values().cloned().collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.get(&id).cloned())
    }

    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        let mut matches: Vec<_> = tables
            .products
            .values()
            .filter(|p| p.name.contains(keyword))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(matches)
    }

    async fn insert_product(&self, data: ProductData) -> Result<Product> {
        let mut tables = self.tables.write().await;
        tables.last_product_id += 1;
        let product = Product {
            id: ProductId::new(tables.last_product_id),
            name: data.name,
            price: data.price,
        };
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, data: ProductData) -> Result<Option<Product>> {
        let mut tables = self.tables.write().await;
        let Some(product) = tables.products.get_mut(&id) else {
            return Ok(None);
        };
        product.name = data.name;
        product.price = data.price;
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&id) {
            return Ok(false);
        }
        if tables.is_product_referenced(id) {
            return Err(StoreError::Integrity {
                entity: "Product",
                id: id.as_i64(),
            });
        }
        tables.products.remove(&id);
        Ok(true)
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .map(|(id, row)| tables.hydrate(*id, row))
            .collect())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(&id).map(|row| tables.hydrate(id, row)))
    }

    async fn orders_for_customers(&self, ids: &[CustomerId]) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .filter(|(_, row)| ids.contains(&row.customer_id))
            .map(|(id, row)| tables.hydrate(*id, row))
            .collect())
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let guard = self.tables.clone().write_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(InMemoryUnitOfWork { guard, working }))
    }
}

/// A unit of work over the in-memory tables.
///
/// Holds the write lock for its whole lifetime and applies its working copy
/// only on commit, so transactions are serialized and an uncommitted unit of
/// work leaves no trace.
pub struct InMemoryUnitOfWork {
    guard: OwnedRwLockWriteGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn customer_exists(&mut self, id: CustomerId) -> Result<bool> {
        Ok(self.working.customers.contains_key(&id))
    }

    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn lock_order(&mut self, id: OrderId) -> Result<Option<OrderStatus>> {
        Ok(self.working.orders.get(&id).map(|row| OrderStatus {
            delivery_complete: row.delivery_complete,
            order_cancelled: row.order_cancelled,
        }))
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<OrderId> {
        self.working.last_order_id += 1;
        let id = OrderId::new(self.working.last_order_id);
        self.working.orders.insert(
            id,
            OrderRow {
                customer_id: order.customer_id,
                order_date: order.order_date,
                delivery_date: order.delivery_date,
                delivery_complete: order.delivery_complete,
                order_cancelled: false,
                total: order.total,
                product_ids: order.product_ids.into_iter().collect(),
            },
        );
        Ok(id)
    }

    async fn mark_order_cancelled(&mut self, id: OrderId) -> Result<()> {
        if let Some(row) = self.working.orders.get_mut(&id) {
            row.order_cancelled = true;
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
