//! HTTP handlers for stock receipts

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::models::{IngredientView, StockUpdate};
use crate::services::stock::{StockReceiptResult, StockService, StockUpdateInput};
use crate::AppState;

pub async fn list_stock_updates(State(state): State<AppState>) -> AppResult<Json<Vec<StockUpdate>>> {
    let service = StockService::new(state.db);
    Ok(Json(service.list().await?))
}

/// Receive stock for an ingredient
pub async fn create_stock_update(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<StockUpdateInput>,
) -> AppResult<(StatusCode, Json<StockReceiptResult>)> {
    let service = StockService::new(state.db);
    let result = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Reverse and delete a receipt
pub async fn delete_stock_update(
    State(state): State<AppState>,
    Path(stock_update_id): Path<Uuid>,
) -> AppResult<Json<IngredientView>> {
    let service = StockService::new(state.db);
    Ok(Json(service.delete(stock_update_id).await?))
}
