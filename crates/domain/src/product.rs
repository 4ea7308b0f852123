//! Product validation and service.

use serde_json::Value;
use store::{Money, Product, ProductData, ProductId, Store};

use crate::error::DomainError;
use crate::validation::{FieldReader, ValidationErrors};

pub const NAME_MAX_LEN: usize = 255;

/// Highest accepted price, 1,000,000.00.
pub const PRICE_MAX_CENTS: i64 = 100_000_000;

const PRODUCT_FIELDS: &[&str] = &["product_id", "name", "price"];

/// Validates a product body for create or full replacement.
///
/// `price` must be a number between 0 and 1,000,000 with at most two
/// decimal places.
pub fn parse_product(body: &Value) -> Result<ProductData, ValidationErrors> {
    let mut reader = FieldReader::new(body, PRODUCT_FIELDS);
    let name = reader.required_string("name", NAME_MAX_LEN);
    let price = reader
        .required_number("price")
        .and_then(|amount| match Money::from_decimal(amount) {
            _ if amount < 0.0 => {
                reader.error("price", "Must be greater than or equal to 0.");
                None
            }
            _ if amount * 100.0 > PRICE_MAX_CENTS as f64 => {
                reader.error("price", "Must be less than or equal to 1000000.");
                None
            }
            Some(price) => Some(price),
            None => {
                reader.error("price", "Must have at most 2 decimal places.");
                None
            }
        });

    match (name, price) {
        (Some(name), Some(price)) if reader.is_clean() => Ok(ProductData { name, price }),
        _ => Err(reader.into_errors()),
    }
}

/// Service for product reads and writes.
pub struct ProductService<S: Store> {
    store: S,
}

impl<S: Store> ProductService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.store.list_products().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, DomainError> {
        self.store
            .get_product(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn search_products(&self, keyword: &str) -> Result<Vec<Product>, DomainError> {
        Ok(self.store.search_products(keyword).await?)
    }

    #[tracing::instrument(skip(self, data))]
    pub async fn create_product(&self, data: ProductData) -> Result<Product, DomainError> {
        let product = self.store.insert_product(data).await?;
        tracing::info!(product_id = %product.id, price = %product.price, "product created");
        Ok(product)
    }

    #[tracing::instrument(skip(self, data))]
    pub async fn update_product(
        &self,
        id: ProductId,
        data: ProductData,
    ) -> Result<Product, DomainError> {
        self.store
            .update_product(id, data)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), DomainError> {
        if self.store.delete_product(id).await? {
            tracing::info!(product_id = %id, "product deleted");
            Ok(())
        } else {
            Err(DomainError::not_found("Product", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use store::InMemoryStore;

    use super::*;
    use crate::validation::MISSING;

    #[test]
    fn test_parse_product() {
        let parsed = parse_product(&json!({ "name": "Widget", "price": 19.99 })).unwrap();
        assert_eq!(parsed.price, Money::from_cents(1999));

        let free = parse_product(&json!({ "name": "Sticker", "price": 0 })).unwrap();
        assert_eq!(free.price, Money::zero());
    }

    #[test]
    fn test_parse_product_price_rules() {
        let errors = parse_product(&json!({ "name": "Widget", "price": -1 })).unwrap_err();
        assert_eq!(errors.messages("price"), ["Must be greater than or equal to 0."]);

        let errors =
            parse_product(&json!({ "name": "Widget", "price": 1_000_000.01 })).unwrap_err();
        assert_eq!(errors.messages("price"), ["Must be less than or equal to 1000000."]);

        let errors =
            parse_product(&json!({ "name": "Big", "price": 50_000_000_000_000_000.0 })).unwrap_err();
        assert_eq!(errors.messages("price"), ["Must be less than or equal to 1000000."]);

        let top = parse_product(&json!({ "name": "Widget", "price": 1_000_000 })).unwrap();
        assert_eq!(top.price.cents(), PRICE_MAX_CENTS);

        let errors = parse_product(&json!({ "name": "Widget", "price": 1.999 })).unwrap_err();
        assert_eq!(errors.messages("price"), ["Must have at most 2 decimal places."]);

        let errors = parse_product(&json!({ "name": "Widget", "price": "cheap" })).unwrap_err();
        assert_eq!(errors.messages("price"), ["Not a valid number."]);
    }

    #[test]
    fn test_parse_product_missing_fields() {
        let errors = parse_product(&json!({})).unwrap_err();
        assert_eq!(errors.messages("name"), [MISSING]);
        assert_eq!(errors.messages("price"), [MISSING]);
    }

    #[tokio::test]
    async fn test_crud() {
        let service = ProductService::new(InMemoryStore::new());
        let created = service
            .create_product(ProductData {
                name: "Widget".to_string(),
                price: Money::from_cents(1999),
            })
            .await
            .unwrap();

        assert_eq!(service.get_product(created.id).await.unwrap(), created);

        let updated = service
            .update_product(
                created.id,
                ProductData {
                    name: "Widget v2".to_string(),
                    price: Money::from_cents(2499),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price.cents(), 2499);

        service.delete_product(created.id).await.unwrap();
        assert!(matches!(
            service.get_product(created.id).await,
            Err(DomainError::NotFound { entity: "Product", .. })
        ));
    }
}
