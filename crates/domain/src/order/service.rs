//! Order service running the placement and cancellation workflows.

use chrono::NaiveDate;
use store::{Money, NewOrder, Order, OrderId, Store};

use super::{CancelOutcome, OrderError, OrderState, PlaceOrder};
use crate::delivery::DeliveryPolicy;
use crate::error::DomainError;
use crate::validation::ValidationErrors;

/// Summary of a newly placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub delivery_date: NaiveDate,
    pub delivery_complete: bool,
    pub total: Money,
}

/// Service for placing, reading and cancelling orders.
pub struct OrderService<S: Store> {
    store: S,
    delivery: DeliveryPolicy,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service with the given store and delivery policy.
    pub fn new(store: S, delivery: DeliveryPolicy) -> Self {
        Self { store, delivery }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.store.list_orders().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, DomainError> {
        self.store
            .get_order(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", id))
    }

    /// Places an order.
    ///
    /// The customer check, every product lookup and the insert run in one
    /// unit of work: an unknown customer or product aborts the whole request
    /// and nothing is written. The total is the sum of the product prices as
    /// read inside that unit of work.
    #[tracing::instrument(skip(self, cmd), fields(customer_id = %cmd.customer_id))]
    pub async fn place_order(&self, cmd: PlaceOrder) -> Result<PlacedOrder, DomainError> {
        if cmd.product_ids.is_empty() {
            metrics::counter!("orders_rejected_total", "reason" => "no_products").increment(1);
            return Err(OrderError::NoProducts.into());
        }

        let delivery = self.delivery.schedule(cmd.order_date).ok_or_else(|| {
            ValidationErrors::single("order_date", "Date is too far in the future.")
        })?;

        let mut uow = self.store.begin().await?;

        if !uow.customer_exists(cmd.customer_id).await? {
            metrics::counter!("orders_rejected_total", "reason" => "unknown_customer")
                .increment(1);
            return Err(DomainError::not_found("Customer", cmd.customer_id));
        }

        let mut total = Money::zero();
        for product_id in &cmd.product_ids {
            let Some(product) = uow.find_product(*product_id).await? else {
                metrics::counter!("orders_rejected_total", "reason" => "unknown_product")
                    .increment(1);
                tracing::warn!(%product_id, "order references unknown product");
                return Err(DomainError::not_found("Product", *product_id));
            };
            let Some(sum) = total.checked_add(product.price) else {
                metrics::counter!("orders_rejected_total", "reason" => "total_overflow")
                    .increment(1);
                return Err(
                    ValidationErrors::single("products", "Order total is too large.").into(),
                );
            };
            total = sum;
        }

        let order_id = uow
            .insert_order(NewOrder {
                customer_id: cmd.customer_id,
                order_date: cmd.order_date,
                delivery_date: delivery.date,
                delivery_complete: delivery.complete,
                total,
                product_ids: cmd.product_ids,
            })
            .await?;
        uow.commit().await?;

        metrics::counter!("orders_created_total").increment(1);
        metrics::histogram!("order_total_cents").record(total.cents() as f64);
        tracing::info!(
            %order_id,
            delivery_date = %delivery.date,
            delivery_complete = delivery.complete,
            %total,
            "order placed"
        );

        Ok(PlacedOrder {
            order_id,
            delivery_date: delivery.date,
            delivery_complete: delivery.complete,
            total,
        })
    }

    /// Cancels an order that has not been delivered.
    ///
    /// The order row is locked between the state check and the write.
    /// Cancelling an already-cancelled order succeeds without writing.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, id: OrderId) -> Result<CancelOutcome, DomainError> {
        let mut uow = self.store.begin().await?;

        let status = uow
            .lock_order(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", id))?;

        let outcome = OrderState::from(status).cancel(id)?;
        if outcome == CancelOutcome::Cancelled {
            uow.mark_order_cancelled(id).await?;
            uow.commit().await?;
            metrics::counter!("orders_cancelled_total").increment(1);
            tracing::info!(order_id = %id, "order cancelled");
        } else {
            tracing::debug!(order_id = %id, "order already cancelled");
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use store::{CustomerData, CustomerId, InMemoryStore, ProductData, ProductId};

    use super::*;
    use crate::delivery::{FixedClock, FixedOffset};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service(store: InMemoryStore, offset: u32, today: NaiveDate) -> OrderService<InMemoryStore> {
        OrderService::new(
            store,
            DeliveryPolicy::new(FixedOffset(offset), FixedClock(today)),
        )
    }

    async fn seed_catalog(store: &InMemoryStore) -> (CustomerId, Vec<ProductId>) {
        let customer = store
            .insert_customer(CustomerData {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: "555-0100".to_string(),
            })
            .await
            .unwrap();
        let mut ids = Vec::new();
        for (name, cents) in [("Widget", 1999), ("Gadget", 500)] {
            let product = store
                .insert_product(ProductData {
                    name: name.to_string(),
                    price: Money::from_cents(cents),
                })
                .await
                .unwrap();
            ids.push(product.id);
        }
        (customer.id, ids)
    }

    #[tokio::test]
    async fn test_place_order_computes_total_and_delivery() {
        let store = InMemoryStore::new();
        let (customer_id, products) = seed_catalog(&store).await;
        let service = service(store, 5, date(2024, 1, 1));

        let placed = service
            .place_order(PlaceOrder::new(customer_id, date(2024, 1, 1), products))
            .await
            .unwrap();

        assert_eq!(placed.total, Money::from_cents(2499));
        assert_eq!(placed.delivery_date, date(2024, 1, 6));
        assert!(!placed.delivery_complete);
    }

    #[tokio::test]
    async fn test_cancel_delivered_order_is_rejected() {
        let store = InMemoryStore::new();
        let (customer_id, products) = seed_catalog(&store).await;
        let service = service(store, 2, date(2024, 6, 1));

        let placed = service
            .place_order(PlaceOrder::new(customer_id, date(2024, 1, 1), products))
            .await
            .unwrap();
        assert!(placed.delivery_complete);

        let err = service.cancel_order(placed.order_id).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Order(OrderError::AlreadyDelivered { .. })
        ));

        let order = service.get_order(placed.order_id).await.unwrap();
        assert!(!order.order_cancelled);
    }

    #[tokio::test]
    async fn test_get_unknown_order_is_not_found() {
        let service = service(InMemoryStore::new(), 2, date(2024, 1, 1));

        let err = service.get_order(OrderId::new(5)).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::NotFound {
                entity: "Order",
                id: 5
            }
        ));
    }
}
