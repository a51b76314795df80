//! HTTP handlers for ingredients and low-stock alerts

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::models::{IngredientView, LowStockAlert};
use crate::services::ingredient::{IngredientInput, IngredientService};
use crate::AppState;

/// List ingredients by category then name
pub async fn list_ingredients(State(state): State<AppState>) -> AppResult<Json<Vec<IngredientView>>> {
    let service = IngredientService::new(state.db);
    Ok(Json(service.list().await?))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(ingredient_id): Path<Uuid>,
) -> AppResult<Json<IngredientView>> {
    let service = IngredientService::new(state.db);
    Ok(Json(service.get(ingredient_id).await?))
}

pub async fn create_ingredient(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<IngredientInput>,
) -> AppResult<(StatusCode, Json<IngredientView>)> {
    let service = IngredientService::new(state.db);
    let ingredient = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}

pub async fn update_ingredient(
    State(state): State<AppState>,
    Path(ingredient_id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<IngredientInput>,
) -> AppResult<Json<IngredientView>> {
    let service = IngredientService::new(state.db);
    Ok(Json(service.update(ingredient_id, input).await?))
}

pub async fn delete_ingredient(
    State(state): State<AppState>,
    Path(ingredient_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = IngredientService::new(state.db);
    service.delete(ingredient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ingredients at or below their minimum threshold
pub async fn low_stock_alerts(State(state): State<AppState>) -> AppResult<Json<Vec<LowStockAlert>>> {
    let service = IngredientService::new(state.db);
    Ok(Json(service.low_stock_alerts().await?))
}
