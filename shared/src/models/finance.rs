//! Finance overview and cash ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shop-wide running totals. There is exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceOverview {
    pub starting_balance: Decimal,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub current_balance: Decimal,
}

/// Kind of balance-affecting event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashTransactionType {
    Sale,
    Deposit,
    Withdrawal,
}

impl CashTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CashTransactionType::Sale => "sale",
            CashTransactionType::Deposit => "deposit",
            CashTransactionType::Withdrawal => "withdrawal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(CashTransactionType::Sale),
            "deposit" => Some(CashTransactionType::Deposit),
            "withdrawal" => Some(CashTransactionType::Withdrawal),
            _ => None,
        }
    }
}

/// Append-only cash ledger row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashTransaction {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub transaction_type: CashTransactionType,
    /// Signed: positive adds to the balance, negative removes from it
    pub amount: Decimal,
    pub note: Option<String>,
    pub balance_after: Decimal,
    pub sale_id: Option<Uuid>,
}

/// A ledger row produced by a finance operation, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashMovement {
    pub transaction_type: CashTransactionType,
    pub amount: Decimal,
    pub note: Option<String>,
    pub balance_after: Decimal,
    pub sale_id: Option<Uuid>,
}
