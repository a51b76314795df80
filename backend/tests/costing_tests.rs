//! Unit conversion and costing tests
//!
//! Tests for:
//! - Base unit round trips for mass and volume
//! - Line cost independence from the units it is expressed in
//! - Product cost, profit and the zero-cost guard

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::costing::{line_cost, profit, recipe_base_quantity};
use shared::models::{Product, ProductWithRecipe, RecipeLine};
use shared::units::{convert, convert_price, from_base, to_base, Unit};
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn product(selling_price: &str, lines: Vec<RecipeLine>) -> ProductWithRecipe {
    let now = Utc::now();
    ProductWithRecipe {
        product: Product {
            id: Uuid::new_v4(),
            name: "Latte".to_string(),
            description: None,
            selling_price: dec(selling_price),
            category: "Coffee".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        },
        ingredients: lines,
    }
}

fn line(quantity_base: &str, base_unit: Unit, cost_per_unit: &str, cost_unit: Unit) -> RecipeLine {
    RecipeLine {
        id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        ingredient_id: Uuid::new_v4(),
        ingredient_name: "Ingredient".to_string(),
        quantity: dec(quantity_base),
        base_unit,
        entry_quantity: dec(quantity_base),
        entry_unit: base_unit,
        ingredient_cost_per_unit: dec(cost_per_unit),
        ingredient_cost_unit: cost_unit,
    }
}

fn any_unit() -> impl Strategy<Value = Unit> {
    prop_oneof![Just(Unit::G), Just(Unit::Kg), Just(Unit::Ml), Just(Unit::L)]
}

/// Quantities with up to 6 decimal places
fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000).prop_map(|v| Decimal::new(v, 6))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_large_units_scale_by_thousand() {
        assert_eq!(to_base(dec("1.5"), Unit::Kg), dec("1500"));
        assert_eq!(to_base(dec("0.25"), Unit::L), dec("250"));
        assert_eq!(to_base(dec("18"), Unit::G), dec("18"));
        assert_eq!(from_base(dec("250"), Unit::L), dec("0.25"));
    }

    #[test]
    fn test_cross_family_conversion_rejected() {
        assert!(convert(dec("1"), Unit::Kg, Unit::Ml).is_err());
        assert!(convert_price(dec("8"), Unit::L, Unit::G).is_err());
    }

    #[test]
    fn test_price_scales_inversely() {
        assert_eq!(convert_price(dec("8.00"), Unit::Kg, Unit::G).unwrap(), dec("0.008"));
    }

    #[test]
    fn test_espresso_shot_cost() {
        // 18 g of beans bought at 450.00 per kg
        let cost = line_cost(dec("450.00"), Unit::Kg, dec("18"), Unit::G);
        assert_eq!(cost, dec("8.1"));
    }

    #[test]
    fn test_product_cost_is_sum_of_lines() {
        let latte = product(
            "4.00",
            vec![
                line("18", Unit::G, "0.05", Unit::G),
                line("200", Unit::Ml, "1.50", Unit::L),
            ],
        );
        // 18 * 0.05 + 200 * 0.0015
        assert_eq!(latte.cost(), dec("1.2"));

        let view = latte.into_view();
        assert_eq!(view.total_cost, dec("1.20"));
        assert_eq!(view.ingredients.len(), 2);
    }

    #[test]
    fn test_latte_profit_example() {
        let summary = profit(dec("4.00"), dec("1.20"));
        assert_eq!(summary.amount, dec("2.80"));
        assert_eq!(summary.percentage, dec("233.33"));
    }

    #[test]
    fn test_product_without_recipe() {
        let water = product("1.50", vec![]);
        assert_eq!(water.cost(), Decimal::ZERO);

        let summary = water.profit();
        assert_eq!(summary.amount, dec("1.50"));
        assert_eq!(summary.percentage, Decimal::ZERO);
    }

    #[test]
    fn test_recipe_quantity_stored_in_base_units() {
        assert_eq!(recipe_base_quantity(dec("0.2"), Unit::L, Unit::Ml).unwrap(), dec("200"));
        assert!(recipe_base_quantity(dec("18"), Unit::G, Unit::L).is_err());
        assert!(recipe_base_quantity(Decimal::ZERO, Unit::G, Unit::G).is_err());
    }

    #[test]
    fn test_recipe_quantity_below_storage_precision_rejected() {
        let err = recipe_base_quantity(dec("0.0000004"), Unit::Ml, Unit::L).unwrap_err();
        assert_eq!(err.field(), Some("quantity"));
        assert!(err.is_validation());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_base_round_trip(value in quantity_strategy(), unit in any_unit()) {
        prop_assert_eq!(from_base(to_base(value, unit), unit), value);
    }

    #[test]
    fn prop_line_cost_independent_of_quantity_unit(
        grams in 1i64..100_000,
        price_cents in 1i64..100_000,
    ) {
        let grams = Decimal::from(grams);
        let price = Decimal::new(price_cents, 2);

        let in_grams = line_cost(price, Unit::Kg, grams, Unit::G);
        let in_kilos = line_cost(price, Unit::Kg, grams / Decimal::from(1000), Unit::Kg);
        prop_assert_eq!(in_grams, in_kilos);
    }

    #[test]
    fn prop_zero_cost_never_divides(price_cents in 0i64..1_000_000) {
        let summary = profit(Decimal::new(price_cents, 2), Decimal::ZERO);
        prop_assert_eq!(summary.percentage, Decimal::ZERO);
        prop_assert_eq!(summary.amount, Decimal::new(price_cents, 2));
    }
}
