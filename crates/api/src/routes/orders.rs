//! Order placement, lookup and cancellation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{CancelOutcome, parse_place_order};
use serde_json::Value;
use store::{OrderId, Store};

use super::{AppState, parse_id};
use crate::error::ApiError;
use crate::views::v1::{MessageView, OrderPlacedView, OrderView};

/// GET /orders
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    let orders = state.orders.list_orders().await?;
    Ok(Json(orders.iter().map(OrderView::from).collect()))
}

/// GET /orders/:id
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderView>, ApiError> {
    let id: OrderId = parse_id(&id)?;
    let order = state.orders.get_order(id).await?;
    Ok(Json(OrderView::from(&order)))
}

/// POST /orders — place an order for a customer.
///
/// Delivery date and total are derived; any such fields in the body are
/// ignored.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderPlacedView>), ApiError> {
    let Json(body) = payload?;
    let cmd = parse_place_order(&body)?;
    let placed = state.orders.place_order(cmd).await?;

    Ok((StatusCode::CREATED, Json(OrderPlacedView::from(&placed))))
}

/// PUT /orders/cancel/:id — cancel an order that has not been delivered.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageView>, ApiError> {
    let id: OrderId = parse_id(&id)?;
    let message = match state.orders.cancel_order(id).await? {
        CancelOutcome::Cancelled => "Order Cancelled",
        CancelOutcome::AlreadyCancelled => "Order Already Cancelled",
    };

    Ok(Json(MessageView::new(message)))
}
