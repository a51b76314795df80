//! HTTP handlers for the finance overview and cash ledger

use axum::{extract::State, http::StatusCode, Json};
use shared::UserRole;

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::middleware::CurrentUser;
use crate::models::{CashTransaction, FinanceOverview};
use crate::services::finance::{CashTransactionInput, FinanceService};
use crate::AppState;

fn service(state: AppState) -> FinanceService {
    FinanceService::new(state.db, state.config.finance.starting_balance)
}

pub async fn get_overview(State(state): State<AppState>) -> AppResult<Json<FinanceOverview>> {
    Ok(Json(service(state).overview().await?))
}

/// Cash ledger, newest first
pub async fn list_cash_transactions(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CashTransaction>>> {
    Ok(Json(service(state).list_transactions().await?))
}

/// Deposit or withdraw cash. Managers and admins only.
pub async fn create_cash_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(input): ValidatedJson<CashTransactionInput>,
) -> AppResult<(StatusCode, Json<CashTransaction>)> {
    current_user
        .0
        .require_role(&[UserRole::Admin, UserRole::Manager])?;

    let transaction = service(state).record_cash(input).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}
