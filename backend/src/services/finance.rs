//! Finance overview and cash ledger persistence
//!
//! The overview is a single row (id = 1). Every mutation locks it with
//! `FOR UPDATE`, applies a rule from `shared::ledger`, writes the new totals
//! and appends the resulting cash transaction in the same transaction.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::error::AppResult;
use crate::models::{
    convert_rows, CashMovement, CashTransaction, CashTransactionRow, CashTransactionType,
    FinanceOverview, FinanceRow,
};

#[derive(Clone)]
pub struct FinanceService {
    db: PgPool,
    starting_balance: Decimal,
}

/// Manual deposit or withdrawal
#[derive(Debug, Deserialize, Validate)]
pub struct CashTransactionInput {
    #[serde(rename = "type")]
    pub transaction_type: CashTransactionType,
    pub amount: Decimal,
    #[validate(length(max = 1000, message = "Note is too long"))]
    pub note: Option<String>,
}

const CASH_TRANSACTION_COLUMNS: &str =
    "id, date, transaction_type, amount, note, balance_after, sale_id";

/// Fetch the overview, creating it on first use, and lock it for the rest
/// of the transaction
pub(crate) async fn lock_overview(
    conn: &mut PgConnection,
    starting_balance: Decimal,
) -> AppResult<FinanceOverview> {
    let opening = FinanceOverview::opening(starting_balance);

    sqlx::query(
        r#"
        INSERT INTO finance_overview (id, starting_balance, total_income, total_expenses, current_balance)
        VALUES (1, $1, 0, 0, $1)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(opening.starting_balance)
    .execute(&mut *conn)
    .await?;

    let row = sqlx::query_as::<_, FinanceRow>(
        r#"
        SELECT starting_balance, total_income, total_expenses, current_balance
        FROM finance_overview
        WHERE id = 1
        FOR UPDATE
        "#,
    )
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.into())
}

pub(crate) async fn save_overview(conn: &mut PgConnection, overview: &FinanceOverview) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE finance_overview
        SET total_income = $1, total_expenses = $2, current_balance = $3, updated_at = NOW()
        WHERE id = 1
        "#,
    )
    .bind(overview.total_income)
    .bind(overview.total_expenses)
    .bind(overview.current_balance)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Append a movement to the cash ledger
pub(crate) async fn append_transaction(
    conn: &mut PgConnection,
    movement: &CashMovement,
) -> AppResult<CashTransaction> {
    let row = sqlx::query_as::<_, CashTransactionRow>(&format!(
        r#"
        INSERT INTO cash_transactions (transaction_type, amount, note, balance_after, sale_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {}
        "#,
        CASH_TRANSACTION_COLUMNS
    ))
    .bind(movement.transaction_type.as_str())
    .bind(movement.amount)
    .bind(&movement.note)
    .bind(movement.balance_after)
    .bind(movement.sale_id)
    .fetch_one(&mut *conn)
    .await?;

    CashTransaction::try_from(row)
}

impl FinanceService {
    pub fn new(db: PgPool, starting_balance: Decimal) -> Self {
        Self {
            db,
            starting_balance,
        }
    }

    pub async fn overview(&self) -> AppResult<FinanceOverview> {
        let mut tx = self.db.begin().await?;
        let overview = lock_overview(&mut tx, self.starting_balance).await?;
        tx.commit().await?;
        Ok(overview)
    }

    /// Cash ledger, newest first
    pub async fn list_transactions(&self) -> AppResult<Vec<CashTransaction>> {
        let rows = sqlx::query_as::<_, CashTransactionRow>(&format!(
            "SELECT {} FROM cash_transactions ORDER BY date DESC, id",
            CASH_TRANSACTION_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        convert_rows(rows)
    }

    /// Record a deposit or withdrawal
    pub async fn record_cash(&self, input: CashTransactionInput) -> AppResult<CashTransaction> {
        let mut tx = self.db.begin().await?;

        let mut overview = lock_overview(&mut tx, self.starting_balance).await?;
        let movement = overview.apply_cash(input.transaction_type, input.amount, input.note)?;

        save_overview(&mut tx, &overview).await?;
        let transaction = append_transaction(&mut tx, &movement).await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = %transaction.id,
            transaction_type = transaction.transaction_type.as_str(),
            amount = %transaction.amount,
            balance = %overview.current_balance,
            "Cash transaction recorded"
        );

        Ok(transaction)
    }
}
