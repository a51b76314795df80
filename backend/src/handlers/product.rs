//! HTTP handlers for products and recipes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::models::ProductView;
use crate::services::product::{ProductInput, ProductService};
use crate::AppState;

pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<ProductView>>> {
    let service = ProductService::new(state.db);
    Ok(Json(service.list().await?))
}

/// Distinct product category labels
pub async fn list_product_categories(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let service = ProductService::new(state.db);
    Ok(Json(service.categories().await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductView>> {
    let service = ProductService::new(state.db);
    Ok(Json(service.get(product_id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ProductInput>,
) -> AppResult<(StatusCode, Json<ProductView>)> {
    let service = ProductService::new(state.db);
    let product = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product and its recipe
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<ProductInput>,
) -> AppResult<Json<ProductView>> {
    let service = ProductService::new(state.db);
    Ok(Json(service.update(product_id, input).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ProductService::new(state.db);
    service.delete(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
