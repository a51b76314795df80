//! Recipe and product costing
//!
//! Costs are always computed per base unit (g or ml) so that an ingredient
//! priced per kilogram and a recipe measured in grams line up without the
//! caller caring about either unit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::types::{percentage_of, round_money, round_quantity};
use crate::units::{price_per_base, to_base, Unit};
use crate::validation::{require_positive, require_same_family};

/// Profit figures for a product at its current cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitSummary {
    pub amount: Decimal,
    /// Profit relative to cost, in percent; zero when cost is zero
    pub percentage: Decimal,
}

/// Cost of one base unit for an ingredient priced per `cost_unit`
pub fn cost_per_base_unit(cost_per_unit: Decimal, cost_unit: Unit) -> Decimal {
    price_per_base(cost_per_unit, cost_unit)
}

/// Cost of `quantity` (in `unit`) of an ingredient priced per `cost_unit`
pub fn line_cost(cost_per_unit: Decimal, cost_unit: Unit, quantity: Decimal, unit: Unit) -> Decimal {
    to_base(quantity, unit) * cost_per_base_unit(cost_per_unit, cost_unit)
}

/// Recipe quantity as stored: `quantity` in `entry_unit`, converted to the
/// base unit of the ingredient's `stock_unit`
pub fn recipe_base_quantity(quantity: Decimal, entry_unit: Unit, stock_unit: Unit) -> DomainResult<Decimal> {
    require_same_family("unit", entry_unit, stock_unit)?;
    let base_quantity = round_quantity(to_base(quantity, entry_unit));
    require_positive("quantity", base_quantity)?;
    Ok(base_quantity)
}

/// Sum of line costs, unrounded
pub fn total_cost<I>(line_costs: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    line_costs.into_iter().sum()
}

/// Profit of selling at `selling_price` something that costs `cost`
pub fn profit(selling_price: Decimal, cost: Decimal) -> ProfitSummary {
    let amount = selling_price - cost;
    ProfitSummary {
        amount: round_money(amount),
        percentage: percentage_of(amount, cost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_recipe_base_quantity() {
        assert_eq!(recipe_base_quantity(dec("0.018"), Unit::Kg, Unit::G).unwrap(), dec("18"));
        assert_eq!(recipe_base_quantity(dec("200"), Unit::Ml, Unit::L).unwrap(), dec("200"));
        assert!(recipe_base_quantity(dec("200"), Unit::Ml, Unit::Kg).is_err());
        assert!(recipe_base_quantity(Decimal::ZERO, Unit::G, Unit::G).is_err());
    }

    #[test]
    fn test_recipe_quantity_rounding_to_zero_rejected() {
        let err = recipe_base_quantity(dec("0.0000001"), Unit::G, Unit::G).unwrap_err();
        assert_eq!(err.field(), Some("quantity"));
        assert!(err.is_validation());
        // the same amount in kg survives conversion
        assert_eq!(recipe_base_quantity(dec("0.0000001"), Unit::Kg, Unit::G).unwrap(), dec("0.0001"));
    }

    #[test]
    fn test_cost_per_base_unit() {
        assert_eq!(cost_per_base_unit(dec("20"), Unit::Kg), dec("0.02"));
        assert_eq!(cost_per_base_unit(dec("0.05"), Unit::G), dec("0.05"));
        assert_eq!(cost_per_base_unit(dec("1.50"), Unit::L), dec("0.0015"));
    }

    #[test]
    fn test_line_cost_mixed_units() {
        // 18 g of beans at 20.00/kg
        assert_eq!(line_cost(dec("20"), Unit::Kg, dec("18"), Unit::G), dec("0.36"));
        // 0.2 l of milk at 0.0012/ml
        assert_eq!(line_cost(dec("0.0012"), Unit::Ml, dec("0.2"), Unit::L), dec("0.24"));
    }

    #[test]
    fn test_total_cost_of_nothing_is_zero() {
        assert_eq!(total_cost(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn test_profit_latte() {
        let summary = profit(dec("4.00"), dec("1.20"));
        assert_eq!(summary.amount, dec("2.80"));
        assert_eq!(summary.percentage, dec("233.33"));
    }

    #[test]
    fn test_profit_zero_cost() {
        let summary = profit(dec("3.50"), Decimal::ZERO);
        assert_eq!(summary.amount, dec("3.50"));
        assert_eq!(summary.percentage, Decimal::ZERO);
    }
}
