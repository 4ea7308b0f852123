//! Customer endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::parse_customer;
use serde_json::Value;
use store::{CustomerId, Store};

use super::{AppState, parse_id};
use crate::error::ApiError;
use crate::views::v1::{CreatedId, CustomerView, MessageView};

/// GET /customers — list all customers with their orders.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<CustomerView>>, ApiError> {
    let customers = state.customers.list_customers().await?;
    Ok(Json(customers.iter().map(CustomerView::from).collect()))
}

/// GET /customers/:id
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CustomerView>, ApiError> {
    let id: CustomerId = parse_id(&id)?;
    let customer = state.customers.get_customer(id).await?;
    Ok(Json(CustomerView::from(&customer)))
}

/// GET /customers/search/:keyword — customers whose name contains the keyword.
#[tracing::instrument(skip(state))]
pub async fn search<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(keyword): Path<String>,
) -> Result<Json<Vec<CustomerView>>, ApiError> {
    let customers = state.customers.search_customers(&keyword).await?;
    Ok(Json(customers.iter().map(CustomerView::from).collect()))
}

/// POST /customers
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageView>), ApiError> {
    let Json(body) = payload?;
    let data = parse_customer(&body)?;
    let customer = state.customers.create_customer(data).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageView::with_id(
            "New Customer Added Successfully",
            CreatedId::Customer(customer.id.as_i64()),
        )),
    ))
}

/// PUT /customers/:id — replace every field of a customer.
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageView>, ApiError> {
    let id: CustomerId = parse_id(&id)?;
    let Json(body) = payload?;
    let data = parse_customer(&body)?;
    state.customers.update_customer(id, data).await?;

    Ok(Json(MessageView::new("Customer Details Updated Successfully")))
}

/// DELETE /customers/:id — fails with 409 while orders reference the customer.
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageView>, ApiError> {
    let id: CustomerId = parse_id(&id)?;
    state.customers.delete_customer(id).await?;

    Ok(Json(MessageView::new("Customer Removed Successfully")))
}
