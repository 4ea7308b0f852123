//! Product endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::parse_product;
use serde_json::Value;
use store::{ProductId, Store};

use super::{AppState, parse_id};
use crate::error::ApiError;
use crate::views::v1::{CreatedId, MessageView, ProductView};

/// GET /products
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ProductView>>, ApiError> {
    let products = state.products.list_products().await?;
    Ok(Json(products.iter().map(ProductView::from).collect()))
}

/// GET /products/:id
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    let id: ProductId = parse_id(&id)?;
    let product = state.products.get_product(id).await?;
    Ok(Json(ProductView::from(&product)))
}

/// GET /products/search/:keyword
#[tracing::instrument(skip(state))]
pub async fn search<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(keyword): Path<String>,
) -> Result<Json<Vec<ProductView>>, ApiError> {
    let products = state.products.search_products(&keyword).await?;
    Ok(Json(products.iter().map(ProductView::from).collect()))
}

/// POST /products
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageView>), ApiError> {
    let Json(body) = payload?;
    let data = parse_product(&body)?;
    let product = state.products.create_product(data).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageView::with_id(
            "New Product Added Successfully",
            CreatedId::Product(product.id.as_i64()),
        )),
    ))
}

/// PUT /products/:id
///
/// Existing orders keep the total captured when they were placed.
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageView>, ApiError> {
    let id: ProductId = parse_id(&id)?;
    let Json(body) = payload?;
    let data = parse_product(&body)?;
    state.products.update_product(id, data).await?;

    Ok(Json(MessageView::new("Product Details Updated Successfully")))
}

/// DELETE /products/:id
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageView>, ApiError> {
    let id: ProductId = parse_id(&id)?;
    state.products.delete_product(id).await?;

    Ok(Json(MessageView::new("Product Removed Successfully")))
}
