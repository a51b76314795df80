//! Finance ledger tests
//!
//! Tests for:
//! - Booking and reversing sales against the overview
//! - Deposits and withdrawals, including insufficient funds
//! - Balance consistency across any sequence of cash events

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::error::DomainError;
use shared::models::{CashTransactionType, FinanceOverview, SaleMetrics};
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[derive(Debug, Clone)]
enum CashEvent {
    Sale { price_cents: i64, cost_cents: i64, quantity: i32 },
    Deposit(i64),
    Withdrawal(i64),
}

fn cash_event_strategy() -> impl Strategy<Value = CashEvent> {
    prop_oneof![
        (1i64..2_000, 0i64..1_500, 1i32..10).prop_map(|(price_cents, cost_cents, quantity)| {
            CashEvent::Sale { price_cents, cost_cents, quantity }
        }),
        (1i64..100_000).prop_map(CashEvent::Deposit),
        (1i64..100_000).prop_map(CashEvent::Withdrawal),
    ]
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_sale_books_revenue_into_balance() {
        let mut overview = FinanceOverview::opening(dec("100.00"));
        let sale_id = Uuid::new_v4();
        let metrics = SaleMetrics::compute(dec("4.00"), dec("1.20"), 2);

        let movement = overview.record_sale(sale_id, &metrics);

        assert_eq!(overview.total_income, dec("8.00"));
        assert_eq!(overview.total_expenses, dec("2.40"));
        assert_eq!(overview.current_balance, dec("108.00"));
        assert_eq!(movement.transaction_type, CashTransactionType::Sale);
        assert_eq!(movement.amount, dec("8.00"));
        assert_eq!(movement.balance_after, dec("108.00"));
        assert_eq!(movement.sale_id, Some(sale_id));
    }

    #[test]
    fn test_zero_cost_sale_adds_no_expense() {
        let mut overview = FinanceOverview::opening(Decimal::ZERO);
        let metrics = SaleMetrics::compute(dec("1.50"), Decimal::ZERO, 1);

        overview.record_sale(Uuid::new_v4(), &metrics);

        assert_eq!(overview.total_expenses, Decimal::ZERO);
        assert_eq!(metrics.profit, dec("1.50"));
    }

    #[test]
    fn test_reversal_keeps_deposits() {
        let mut overview = FinanceOverview::opening(dec("50.00"));
        let sale_id = Uuid::new_v4();
        let metrics = SaleMetrics::compute(dec("4.00"), dec("1.20"), 1);

        overview.record_sale(sale_id, &metrics);
        overview.deposit(dec("25.00"), None).unwrap();
        let movement = overview.reverse_sale(sale_id, metrics.revenue, metrics.cost);

        assert_eq!(overview.total_income, Decimal::ZERO);
        assert_eq!(overview.total_expenses, Decimal::ZERO);
        assert_eq!(overview.current_balance, dec("75.00"));
        assert_eq!(movement.amount, dec("-4.00"));
    }

    #[test]
    fn test_withdrawal_over_balance_rejected() {
        let mut overview = FinanceOverview::opening(dec("10.00"));
        overview.record_sale(Uuid::new_v4(), &SaleMetrics::compute(dec("5.00"), dec("2.00"), 1));
        let before = overview;

        let result = overview.withdraw(dec("15.01"), Some("float".to_string()));

        assert!(matches!(
            result,
            Err(DomainError::InsufficientFunds { .. })
        ));
        assert_eq!(overview, before);
    }

    #[test]
    fn test_withdrawal_stored_negative() {
        let mut overview = FinanceOverview::opening(dec("10.00"));
        let movement = overview.withdraw(dec("10.00"), None).unwrap();

        assert_eq!(movement.amount, dec("-10.00"));
        assert_eq!(overview.current_balance, Decimal::ZERO);
        assert_eq!(overview.total_income, Decimal::ZERO);
    }

    #[test]
    fn test_cash_amounts_must_be_positive() {
        let mut overview = FinanceOverview::opening(dec("10.00"));
        assert!(overview.deposit(Decimal::ZERO, None).is_err());
        assert!(overview.withdraw(dec("-1"), None).is_err());
        assert!(overview
            .apply_cash(CashTransactionType::Sale, dec("1"), None)
            .is_err());
    }

    #[test]
    fn test_cash_amounts_rounded_to_cents() {
        let mut overview = FinanceOverview::opening(Decimal::ZERO);
        let movement = overview.deposit(dec("10.005"), None).unwrap();
        assert_eq!(movement.amount, dec("10.01"));
    }

    #[test]
    fn test_deposit_rounding_to_zero_rejected() {
        let mut overview = FinanceOverview::opening(dec("5.00"));
        let before = overview;

        match overview.deposit(dec("0.004"), None) {
            Err(err) => assert_eq!(err.field(), Some("amount")),
            Ok(movement) => panic!("expected rejection, got {:?}", movement),
        }
        assert_eq!(overview, before);
    }

    #[test]
    fn test_withdrawal_checked_at_cent_precision() {
        let mut overview = FinanceOverview::opening(dec("20.00"));
        let before = overview;

        // rounds to 20.01, one cent over the balance
        assert!(matches!(
            overview.withdraw(dec("20.005"), None),
            Err(DomainError::InsufficientFunds { .. })
        ));
        assert_eq!(overview, before);

        // rounds to exactly the balance; the stored movement matches the debit
        let movement = overview.withdraw(dec("20.004"), None).unwrap();
        assert_eq!(movement.amount, dec("-20.00"));
        assert_eq!(overview.current_balance, Decimal::ZERO);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_balance_equals_starting_plus_cash(
        events in prop::collection::vec(cash_event_strategy(), 0..40)
    ) {
        let starting = dec("200.00");
        let mut overview = FinanceOverview::opening(starting);
        let mut net_cash = Decimal::ZERO;

        for event in events {
            match event {
                CashEvent::Sale { price_cents, cost_cents, quantity } => {
                    let metrics = SaleMetrics::compute(
                        Decimal::new(price_cents, 2),
                        Decimal::new(cost_cents, 2),
                        quantity,
                    );
                    overview.record_sale(Uuid::new_v4(), &metrics);
                }
                CashEvent::Deposit(cents) => {
                    let movement = overview.deposit(Decimal::new(cents, 2), None).unwrap();
                    net_cash += movement.amount;
                }
                CashEvent::Withdrawal(cents) => {
                    if let Ok(movement) = overview.withdraw(Decimal::new(cents, 2), None) {
                        net_cash += movement.amount;
                    }
                }
            }
            prop_assert!(overview.current_balance >= Decimal::ZERO);
        }

        prop_assert_eq!(
            overview.current_balance,
            starting + overview.total_income + net_cash
        );
    }

    #[test]
    fn prop_record_then_reverse_restores_overview(
        price_cents in 0i64..5_000,
        cost_cents in 0i64..5_000,
        quantity in 1i32..50,
    ) {
        let mut overview = FinanceOverview::opening(dec("123.45"));
        overview.deposit(dec("10"), None).unwrap();
        let before = overview;

        let sale_id = Uuid::new_v4();
        let metrics = SaleMetrics::compute(
            Decimal::new(price_cents, 2),
            Decimal::new(cost_cents, 2),
            quantity,
        );
        overview.record_sale(sale_id, &metrics);
        overview.reverse_sale(sale_id, metrics.revenue, metrics.cost);

        prop_assert_eq!(overview, before);
    }
}
