//! HTTP handlers for ingredient categories

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::models::IngredientCategory;
use crate::services::category::{CategoryInput, CategoryService};
use crate::AppState;

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<IngredientCategory>>> {
    let service = CategoryService::new(state.db);
    Ok(Json(service.list().await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CategoryInput>,
) -> AppResult<(StatusCode, Json<IngredientCategory>)> {
    let service = CategoryService::new(state.db);
    let category = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn rename_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<CategoryInput>,
) -> AppResult<Json<IngredientCategory>> {
    let service = CategoryService::new(state.db);
    Ok(Json(service.rename(category_id, input).await?))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = CategoryService::new(state.db);
    service.delete(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
