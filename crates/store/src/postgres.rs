use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::{
    Customer, CustomerData, CustomerId, Money, NewOrder, Order, OrderId, OrderStatus, Product,
    ProductData, ProductId, Result, StoreError,
    store::{Store, UnitOfWork},
};

const ORDER_COLUMNS: &str = r#"
    SELECT o.order_id, o.customer_id, c.name AS customer_name, o.order_date,
           o.delivery_date, o.delivery_complete, o.order_cancelled, o.order_total_cents
    FROM orders o
    JOIN customers c ON c.customer_id = o.customer_id
"#;

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_customer(row: PgRow) -> Result<Customer> {
        Ok(Customer {
            id: CustomerId::new(row.try_get("customer_id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
        })
    }

    fn row_to_product(row: &PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("product_id")?),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price_cents")?),
        })
    }

    /// Loads the products of the given order rows in one query and builds
    /// the hydrated orders.
    async fn hydrate_orders(&self, rows: Vec<PgRow>) -> Result<Vec<Order>> {
        let order_ids: Vec<i64> = rows
            .iter()
            .map(|row| row.try_get::<i64, _>("order_id"))
            .collect::<std::result::Result<_, _>>()?;

        let product_rows = sqlx::query(
            r#"
            SELECT op.order_id, p.product_id, p.name, p.price_cents
            FROM order_product op
            JOIN products p ON p.product_id = op.product_id
            WHERE op.order_id = ANY($1)
            ORDER BY op.order_id ASC, p.product_id ASC
            "#,
        )
        .bind(&order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut products: HashMap<i64, Vec<Product>> = HashMap::new();
        for row in &product_rows {
            let order_id: i64 = row.try_get("order_id")?;
            products
                .entry(order_id)
                .or_default()
                .push(Self::row_to_product(row)?);
        }

        rows.into_iter()
            .map(|row| {
                let order_id: i64 = row.try_get("order_id")?;
                Ok(Order {
                    id: OrderId::new(order_id),
                    customer_id: CustomerId::new(row.try_get("customer_id")?),
                    customer_name: row.try_get("customer_name")?,
                    order_date: row.try_get::<NaiveDate, _>("order_date")?,
                    delivery_date: row.try_get::<NaiveDate, _>("delivery_date")?,
                    delivery_complete: row.try_get("delivery_complete")?,
                    order_cancelled: row.try_get("order_cancelled")?,
                    total: Money::from_cents(row.try_get("order_total_cents")?),
                    products: products.remove(&order_id).unwrap_or_default(),
                })
            })
            .collect()
    }
}

/// Escapes LIKE wildcards so the keyword is matched as a literal substring.
fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Maps a foreign key violation on delete to `StoreError::Integrity`.
fn integrity_error(err: sqlx::Error, entity: &'static str, id: i64) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_foreign_key_violation()
    {
        return StoreError::Integrity { entity, id };
    }
    StoreError::Database(err)
}

#[async_trait]
impl Store for PostgresStore {
    async fn list_customers(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query(
            "SELECT customer_id, name, email, phone FROM customers ORDER BY customer_id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_customer).collect()
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query(
            "SELECT customer_id, name, email, phone FROM customers WHERE customer_id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_customer).transpose()
    }

    async fn search_customers(&self, keyword: &str) -> Result<Vec<Customer>> {
        let rows = sqlx::query(
            r#"
            SELECT customer_id, name, email, phone
            FROM customers
            WHERE name LIKE $1
            ORDER BY name ASC, customer_id ASC
            "#,
        )
        .bind(like_pattern(keyword))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_customer).collect()
    }

    async fn insert_customer(&self, data: CustomerData) -> Result<Customer> {
        let row = sqlx::query(
            r#"
            INSERT INTO customers (name, email, phone)
            VALUES ($1, $2, $3)
            RETURNING customer_id, name, email, phone
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_customer(row)
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        data: CustomerData,
    ) -> Result<Option<Customer>> {
        let row = sqlx::query(
            r#"
            UPDATE customers SET name = $2, email = $3, phone = $4
            WHERE customer_id = $1
            RETURNING customer_id, name, email, phone
            "#,
        )
        .bind(id.as_i64())
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_customer).transpose()
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE customer_id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| integrity_error(e, "Customer", id.as_i64()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows =
            sqlx::query("SELECT product_id, name, price_cents FROM products ORDER BY product_id")
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(Self::row_to_product).collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row =
            sqlx::query("SELECT product_id, name, price_cents FROM products WHERE product_id = $1")
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, name, price_cents
            FROM products
            WHERE name LIKE $1
            ORDER BY name ASC, product_id ASC
            "#,
        )
        .bind(like_pattern(keyword))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_product).collect()
    }

    async fn insert_product(&self, data: ProductData) -> Result<Product> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (name, price_cents)
            VALUES ($1, $2)
            RETURNING product_id, name, price_cents
            "#,
        )
        .bind(&data.name)
        .bind(data.price.cents())
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_product(&row)
    }

    async fn update_product(&self, id: ProductId, data: ProductData) -> Result<Option<Product>> {
        let row = sqlx::query(
            r#"
            UPDATE products SET name = $2, price_cents = $3
            WHERE product_id = $1
            RETURNING product_id, name, price_cents
            "#,
        )
        .bind(id.as_i64())
        .bind(&data.name)
        .bind(data.price.cents())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| integrity_error(e, "Product", id.as_i64()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!("{ORDER_COLUMNS} ORDER BY o.order_id ASC"))
            .fetch_all(&self.pool)
            .await?;

        self.hydrate_orders(rows).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let rows = sqlx::query(&format!("{ORDER_COLUMNS} WHERE o.order_id = $1"))
            .bind(id.as_i64())
            .fetch_all(&self.pool)
            .await?;

        Ok(self.hydrate_orders(rows).await?.into_iter().next())
    }

    async fn orders_for_customers(&self, ids: &[CustomerId]) -> Result<Vec<Order>> {
        let ids: Vec<i64> = ids.iter().map(CustomerId::as_i64).collect();
        let rows = sqlx::query(&format!(
            "{ORDER_COLUMNS} WHERE o.customer_id = ANY($1) ORDER BY o.order_id ASC"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate_orders(rows).await
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresUnitOfWork { tx }))
    }
}

/// A unit of work backed by a PostgreSQL transaction.
///
/// sqlx rolls the transaction back when it is dropped uncommitted.
pub struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn customer_exists(&mut self, id: CustomerId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM customers WHERE customer_id = $1 FOR SHARE")
            .bind(id.as_i64())
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.is_some())
    }

    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            "SELECT product_id, name, price_cents FROM products WHERE product_id = $1 FOR SHARE",
        )
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(PostgresStore::row_to_product).transpose()
    }

    async fn lock_order(&mut self, id: OrderId) -> Result<Option<OrderStatus>> {
        let row = sqlx::query(
            r#"
            SELECT delivery_complete, order_cancelled
            FROM orders
            WHERE order_id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        match row {
            Some(row) => Ok(Some(OrderStatus {
                delivery_complete: row.try_get("delivery_complete")?,
                order_cancelled: row.try_get("order_cancelled")?,
            })),
            None => Ok(None),
        }
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<OrderId> {
        let order_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (customer_id, order_date, delivery_date, delivery_complete,
                                order_cancelled, order_total_cents)
            VALUES ($1, $2, $3, $4, FALSE, $5)
            RETURNING order_id
            "#,
        )
        .bind(order.customer_id.as_i64())
        .bind(order.order_date)
        .bind(order.delivery_date)
        .bind(order.delivery_complete)
        .bind(order.total.cents())
        .fetch_one(&mut *self.tx)
        .await?;

        let product_ids: Vec<i64> = order.product_ids.iter().map(ProductId::as_i64).collect();
        sqlx::query(
            r#"
            INSERT INTO order_product (order_id, product_id)
            SELECT $1, UNNEST($2::BIGINT[])
            "#,
        )
        .bind(order_id)
        .bind(&product_ids)
        .execute(&mut *self.tx)
        .await?;

        Ok(OrderId::new(order_id))
    }

    async fn mark_order_cancelled(&mut self, id: OrderId) -> Result<()> {
        sqlx::query("UPDATE orders SET order_cancelled = TRUE WHERE order_id = $1")
            .bind(id.as_i64())
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_keyword() {
        assert_eq!(like_pattern("Wid"), "%Wid%");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
