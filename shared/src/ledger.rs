//! Finance ledger rules
//!
//! The cash balance moves only with cash: a sale brings in its revenue, a
//! deposit or withdrawal moves its amount. Ingredient cost of sales is
//! accumulated in `total_expenses` for reporting but never debited from the
//! balance. Reversing a sale undoes exactly what recording it did.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::{CashMovement, CashTransactionType, FinanceOverview, SaleMetrics};
use crate::types::round_money;
use crate::validation::require_positive;

impl FinanceOverview {
    /// Fresh overview with nothing booked yet
    pub fn opening(starting_balance: Decimal) -> Self {
        let starting_balance = round_money(starting_balance);
        Self {
            starting_balance,
            total_income: Decimal::ZERO,
            total_expenses: Decimal::ZERO,
            current_balance: starting_balance,
        }
    }

    /// Book a new sale
    pub fn record_sale(&mut self, sale_id: Uuid, metrics: &SaleMetrics) -> CashMovement {
        self.total_income += metrics.revenue;
        if metrics.cost > Decimal::ZERO {
            self.total_expenses += metrics.cost;
        }
        self.current_balance += metrics.revenue;

        CashMovement {
            transaction_type: CashTransactionType::Sale,
            amount: metrics.revenue,
            note: Some(format!("Sale {}", sale_id)),
            balance_after: self.current_balance,
            sale_id: Some(sale_id),
        }
    }

    /// Undo a sale booked with `revenue` and `cost`
    pub fn reverse_sale(&mut self, sale_id: Uuid, revenue: Decimal, cost: Decimal) -> CashMovement {
        self.total_income -= revenue;
        if cost > Decimal::ZERO {
            self.total_expenses -= cost;
        }
        self.current_balance -= revenue;

        CashMovement {
            transaction_type: CashTransactionType::Sale,
            amount: -revenue,
            note: Some(format!("Sale {} deleted", sale_id)),
            balance_after: self.current_balance,
            sale_id: Some(sale_id),
        }
    }

    pub fn deposit(&mut self, amount: Decimal, note: Option<String>) -> DomainResult<CashMovement> {
        let amount = round_money(amount);
        require_positive("amount", amount)?;
        self.current_balance += amount;

        Ok(CashMovement {
            transaction_type: CashTransactionType::Deposit,
            amount,
            note,
            balance_after: self.current_balance,
            sale_id: None,
        })
    }

    /// Take cash out; rejected without touching anything if the balance
    /// does not cover it
    pub fn withdraw(&mut self, amount: Decimal, note: Option<String>) -> DomainResult<CashMovement> {
        let amount = round_money(amount);
        require_positive("amount", amount)?;
        if amount > self.current_balance {
            return Err(DomainError::InsufficientFunds {
                requested: amount,
                available: self.current_balance,
            });
        }
        self.current_balance -= amount;

        Ok(CashMovement {
            transaction_type: CashTransactionType::Withdrawal,
            amount: -amount,
            note,
            balance_after: self.current_balance,
            sale_id: None,
        })
    }

    /// Apply a deposit or withdrawal by type
    pub fn apply_cash(
        &mut self,
        transaction_type: CashTransactionType,
        amount: Decimal,
        note: Option<String>,
    ) -> DomainResult<CashMovement> {
        match transaction_type {
            CashTransactionType::Deposit => self.deposit(amount, note),
            CashTransactionType::Withdrawal => self.withdraw(amount, note),
            CashTransactionType::Sale => Err(DomainError::validation(
                "type",
                "Sale transactions are recorded through sales",
            )),
        }
    }
}
