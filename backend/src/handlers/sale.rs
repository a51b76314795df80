//! HTTP handlers for sales

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::models::SaleView;
use crate::services::sale::{SaleInput, SaleReversal, SaleService};
use crate::AppState;

fn service(state: AppState) -> SaleService {
    SaleService::new(state.db, state.config.finance.starting_balance)
}

pub async fn list_sales(State(state): State<AppState>) -> AppResult<Json<Vec<SaleView>>> {
    Ok(Json(service(state).list().await?))
}

pub async fn get_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<SaleView>> {
    Ok(Json(service(state).get(sale_id).await?))
}

/// Record a sale, consuming stock and booking revenue
pub async fn create_sale(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<SaleInput>,
) -> AppResult<(StatusCode, Json<SaleView>)> {
    let sale = service(state).create(input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// Delete a sale and reverse its stock and finance effects
pub async fn delete_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<SaleReversal>> {
    Ok(Json(service(state).delete(sale_id).await?))
}
