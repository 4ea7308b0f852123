//! Customer validation and service.

use std::collections::HashMap;

use serde_json::Value;
use store::{Customer, CustomerData, CustomerId, Order, Store};

use crate::error::DomainError;
use crate::validation::{FieldReader, ValidationErrors};

pub const NAME_MAX_LEN: usize = 255;
pub const EMAIL_MAX_LEN: usize = 320;
pub const PHONE_MAX_LEN: usize = 15;

/// `customer_id` and `orders` are read-only and ignored on input.
const CUSTOMER_FIELDS: &[&str] = &["customer_id", "name", "email", "phone", "orders"];

/// Validates a customer body for create or full replacement.
pub fn parse_customer(body: &Value) -> Result<CustomerData, ValidationErrors> {
    let mut reader = FieldReader::new(body, CUSTOMER_FIELDS);
    let name = reader.required_string("name", NAME_MAX_LEN);
    let email = reader.required_string("email", EMAIL_MAX_LEN);
    let phone = reader.required_string("phone", PHONE_MAX_LEN);

    match (name, email, phone) {
        (Some(name), Some(email), Some(phone)) if reader.is_clean() => {
            Ok(CustomerData { name, email, phone })
        }
        _ => Err(reader.into_errors()),
    }
}

/// A customer together with the orders they placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerWithOrders {
    pub customer: Customer,
    pub orders: Vec<Order>,
}

/// Service for customer reads and writes.
pub struct CustomerService<S: Store> {
    store: S,
}

impl<S: Store> CustomerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Attaches orders to customers with a single order query.
    async fn with_orders(
        &self,
        customers: Vec<Customer>,
    ) -> Result<Vec<CustomerWithOrders>, DomainError> {
        if customers.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<CustomerId> = customers.iter().map(|c| c.id).collect();
        let mut by_customer: HashMap<CustomerId, Vec<Order>> = HashMap::new();
        for order in self.store.orders_for_customers(&ids).await? {
            by_customer.entry(order.customer_id).or_default().push(order);
        }

        Ok(customers
            .into_iter()
            .map(|customer| CustomerWithOrders {
                orders: by_customer.remove(&customer.id).unwrap_or_default(),
                customer,
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<CustomerWithOrders>, DomainError> {
        let customers = self.store.list_customers().await?;
        self.with_orders(customers).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_customer(&self, id: CustomerId) -> Result<CustomerWithOrders, DomainError> {
        let customer = self
            .store
            .get_customer(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", id))?;
        let orders = self.store.orders_for_customers(&[id]).await?;
        Ok(CustomerWithOrders { customer, orders })
    }

    #[tracing::instrument(skip(self))]
    pub async fn search_customers(
        &self,
        keyword: &str,
    ) -> Result<Vec<CustomerWithOrders>, DomainError> {
        let customers = self.store.search_customers(keyword).await?;
        self.with_orders(customers).await
    }

    #[tracing::instrument(skip(self, data))]
    pub async fn create_customer(&self, data: CustomerData) -> Result<Customer, DomainError> {
        let customer = self.store.insert_customer(data).await?;
        tracing::info!(customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    #[tracing::instrument(skip(self, data))]
    pub async fn update_customer(
        &self,
        id: CustomerId,
        data: CustomerData,
    ) -> Result<Customer, DomainError> {
        self.store
            .update_customer(id, data)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_customer(&self, id: CustomerId) -> Result<(), DomainError> {
        if self.store.delete_customer(id).await? {
            tracing::info!(customer_id = %id, "customer deleted");
            Ok(())
        } else {
            Err(DomainError::not_found("Customer", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use store::InMemoryStore;

    use super::*;
    use crate::validation::MISSING;

    fn data(name: &str) -> CustomerData {
        CustomerData {
            name: name.to_string(),
            email: "someone@example.com".to_string(),
            phone: "555-0100".to_string(),
        }
    }

    #[test]
    fn test_parse_customer() {
        let body = json!({ "name": "Ada", "email": "ada@example.com", "phone": "555-0100" });
        let parsed = parse_customer(&body).unwrap();
        assert_eq!(parsed.name, "Ada");
        assert_eq!(parsed.phone, "555-0100");
    }

    #[test]
    fn test_parse_customer_reports_every_field() {
        let body = json!({ "name": "", "phone": "0123456789012345" });
        let errors = parse_customer(&body).unwrap_err();
        assert_eq!(errors.messages("name"), ["Field may not be blank."]);
        assert_eq!(errors.messages("email"), [MISSING]);
        assert_eq!(errors.messages("phone"), ["Longer than maximum length 15."]);
    }

    #[test]
    fn test_parse_customer_ignores_read_only_fields() {
        let body = json!({
            "customer_id": 9,
            "name": "Ada",
            "email": "ada@example.com",
            "phone": "555-0100",
            "orders": []
        });
        assert!(parse_customer(&body).is_ok());
    }

    #[tokio::test]
    async fn test_get_missing_customer_is_not_found() {
        let service = CustomerService::new(InMemoryStore::new());
        let err = service.get_customer(CustomerId::new(1)).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Customer", id: 1 }));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let service = CustomerService::new(InMemoryStore::new());
        let created = service.create_customer(data("Ada")).await.unwrap();

        let updated = service
            .update_customer(created.id, data("Grace"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Grace");

        service.delete_customer(created.id).await.unwrap();
        assert!(matches!(
            service.delete_customer(created.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            service.update_customer(created.id, data("Ada")).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_orders_by_name() {
        let service = CustomerService::new(InMemoryStore::new());
        for name in ["Maria Lopez", "Ada Lovelace", "Grace Hopper"] {
            service.create_customer(data(name)).await.unwrap();
        }

        let found = service.search_customers("Lo").await.unwrap();
        let names: Vec<_> = found.iter().map(|c| c.customer.name.as_str()).collect();
        assert_eq!(names, vec!["Ada Lovelace", "Maria Lopez"]);
        assert!(found.iter().all(|c| c.orders.is_empty()));
    }
}
