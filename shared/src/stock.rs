//! Stock ledger: receipts, sale deductions and their reversals
//!
//! Stock is stored in each ingredient's own `stock_unit` and cost in its
//! `cost_unit`, but every calculation here happens in base units (g or ml)
//! and is converted back only when the new values are written out.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::{Ingredient, RecipeLine};
use crate::types::{round_money, round_quantity};
use crate::units::{from_base, price_per_base, to_base, Unit};
use crate::validation::{require_non_negative, require_positive};

/// Incoming stock, as entered on a stock update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub quantity: Decimal,
    pub unit: Unit,
    /// Price per one `cost_unit`
    pub cost_per_unit: Decimal,
    pub cost_unit: Unit,
}

impl Receipt {
    pub fn validate(&self) -> DomainResult<()> {
        require_positive("quantity", self.quantity)?;
        require_non_negative("cost_per_unit", self.cost_per_unit)?;
        self.unit.ensure_same_family(self.cost_unit)
    }

    pub fn base_quantity(&self) -> Decimal {
        to_base(self.quantity, self.unit)
    }

    pub fn cost_per_base_unit(&self) -> Decimal {
        price_per_base(self.cost_per_unit, self.cost_unit)
    }

    /// Total amount paid for the receipt
    pub fn total_cost(&self) -> Decimal {
        round_money(self.base_quantity() * self.cost_per_base_unit())
    }
}

/// Add a receipt to an ingredient, blending its cost by weighted average.
///
/// new cost per base unit =
///   (stock_base * cost_base + received_base * received_cost_base)
///   / (stock_base + received_base)
///
/// With no stock on hand the received cost is adopted as is.
pub fn receive(ingredient: &mut Ingredient, receipt: &Receipt) -> DomainResult<()> {
    receipt.validate()?;
    receipt.unit.ensure_same_family(ingredient.stock_unit)?;

    let stock_base = ingredient.stock_in_base_unit();
    let received_base = receipt.base_quantity();
    let received_cost_base = receipt.cost_per_base_unit();
    let new_stock_base = stock_base + received_base;

    let new_cost_base = if stock_base <= Decimal::ZERO {
        received_cost_base
    } else {
        let existing_value = stock_base * ingredient.cost_per_base_unit();
        let received_value = received_base * received_cost_base;
        (existing_value + received_value) / new_stock_base
    };

    ingredient.current_stock = round_quantity(from_base(new_stock_base, ingredient.stock_unit));
    ingredient.cost_per_unit = round_quantity(to_base(new_cost_base, ingredient.cost_unit));
    Ok(())
}

/// Undo a receipt previously applied with [`receive`].
///
/// This is an approximation, not an exact inverse: once sales or other
/// receipts have touched the ingredient, the receipt's contribution to the
/// blended cost can only be estimated from the current totals. The cost is
/// left unchanged when nothing remains in stock or the estimate is not
/// positive.
pub fn revert_receipt(ingredient: &mut Ingredient, receipt: &Receipt) -> DomainResult<()> {
    receipt.unit.ensure_same_family(ingredient.stock_unit)?;

    let stock_base = ingredient.stock_in_base_unit();
    let received_base = receipt.base_quantity();

    if stock_base < received_base {
        return Err(DomainError::InsufficientStock {
            ingredient: ingredient.name.clone(),
            required: received_base,
            available: stock_base,
            shortfall: received_base - stock_base,
            unit: ingredient.stock_unit.base(),
        });
    }

    let remaining_base = stock_base - received_base;
    if remaining_base > Decimal::ZERO {
        let remaining_value = stock_base * ingredient.cost_per_base_unit()
            - received_base * receipt.cost_per_base_unit();
        if remaining_value > Decimal::ZERO {
            let cost_base = remaining_value / remaining_base;
            ingredient.cost_per_unit = round_quantity(to_base(cost_base, ingredient.cost_unit));
        }
    }

    ingredient.current_stock = round_quantity(from_base(remaining_base, ingredient.stock_unit));
    Ok(())
}

/// Base-unit amount of one ingredient consumed by a sale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockRequirement {
    pub ingredient_id: Uuid,
    pub base_quantity: Decimal,
}

/// New stock level for an ingredient after a planned movement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockChange {
    pub ingredient_id: Uuid,
    pub new_stock: Decimal,
}

/// Total base-unit consumption per ingredient for `quantity` units of a
/// product. Lines that share an ingredient are merged; output is ordered by
/// ingredient id so callers lock rows in a stable order.
pub fn sale_requirements(lines: &[RecipeLine], quantity: i32) -> Vec<StockRequirement> {
    let multiplier = Decimal::from(quantity);
    let mut totals: BTreeMap<Uuid, Decimal> = BTreeMap::new();

    for line in lines {
        *totals.entry(line.ingredient_id).or_insert(Decimal::ZERO) += line.quantity * multiplier;
    }

    totals
        .into_iter()
        .map(|(ingredient_id, base_quantity)| StockRequirement {
            ingredient_id,
            base_quantity,
        })
        .collect()
}

/// Check every requirement against current stock, then compute deductions.
///
/// All-or-nothing: the first shortfall aborts the plan before any change is
/// produced.
pub fn plan_deduction(
    requirements: &[StockRequirement],
    ingredients: &HashMap<Uuid, Ingredient>,
) -> DomainResult<Vec<StockChange>> {
    for requirement in requirements {
        let ingredient = lookup(ingredients, requirement.ingredient_id)?;
        let available = ingredient.stock_in_base_unit();

        if requirement.base_quantity > available {
            return Err(DomainError::InsufficientStock {
                ingredient: ingredient.name.clone(),
                required: requirement.base_quantity,
                available,
                shortfall: requirement.base_quantity - available,
                unit: ingredient.stock_unit.base(),
            });
        }
    }

    requirements
        .iter()
        .map(|requirement| {
            let ingredient = lookup(ingredients, requirement.ingredient_id)?;
            let remaining = ingredient.stock_in_base_unit() - requirement.base_quantity;
            Ok(StockChange {
                ingredient_id: ingredient.id,
                new_stock: round_quantity(from_base(remaining, ingredient.stock_unit)),
            })
        })
        .collect()
}

/// Stock levels after giving back what a sale consumed. Ingredients that no
/// longer exist are skipped.
pub fn plan_restoration(
    requirements: &[StockRequirement],
    ingredients: &HashMap<Uuid, Ingredient>,
) -> Vec<StockChange> {
    requirements
        .iter()
        .filter_map(|requirement| {
            let ingredient = ingredients.get(&requirement.ingredient_id)?;
            let restored = ingredient.stock_in_base_unit() + requirement.base_quantity;
            Some(StockChange {
                ingredient_id: ingredient.id,
                new_stock: round_quantity(from_base(restored, ingredient.stock_unit)),
            })
        })
        .collect()
}

fn lookup(ingredients: &HashMap<Uuid, Ingredient>, id: Uuid) -> DomainResult<&Ingredient> {
    ingredients
        .get(&id)
        .ok_or_else(|| DomainError::validation("ingredient_id", format!("Ingredient {} not found", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ingredient(stock: &str, stock_unit: Unit, cost: &str, cost_unit: Unit) -> Ingredient {
        Ingredient {
            id: Uuid::new_v4(),
            name: "Espresso Beans".to_string(),
            category_id: Uuid::new_v4(),
            category_name: "Coffee Beans".to_string(),
            current_stock: dec(stock),
            stock_unit,
            min_threshold: dec("500"),
            threshold_unit: Unit::G,
            cost_per_unit: dec(cost),
            cost_unit,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(ingredient: &Ingredient, base_quantity: &str) -> RecipeLine {
        RecipeLine {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            ingredient_id: ingredient.id,
            ingredient_name: ingredient.name.clone(),
            quantity: dec(base_quantity),
            base_unit: ingredient.stock_unit.base(),
            entry_quantity: dec(base_quantity),
            entry_unit: ingredient.stock_unit.base(),
            ingredient_cost_per_unit: ingredient.cost_per_unit,
            ingredient_cost_unit: ingredient.cost_unit,
        }
    }

    #[test]
    fn test_receive_blends_weighted_average() {
        let mut beans = ingredient("1000", Unit::G, "0.05", Unit::G);
        let receipt = Receipt {
            quantity: dec("500"),
            unit: Unit::G,
            cost_per_unit: dec("0.08"),
            cost_unit: Unit::G,
        };

        receive(&mut beans, &receipt).unwrap();

        assert_eq!(beans.current_stock, dec("1500"));
        // (1000 * 0.05 + 500 * 0.08) / 1500 = 90 / 1500
        assert_eq!(beans.cost_per_unit, dec("0.06"));
    }

    #[test]
    fn test_receive_converts_units() {
        // Stock in kg priced per kg, receipt in g priced per g
        let mut beans = ingredient("2", Unit::Kg, "20", Unit::Kg);
        let receipt = Receipt {
            quantity: dec("500"),
            unit: Unit::G,
            cost_per_unit: dec("0.03"),
            cost_unit: Unit::G,
        };

        receive(&mut beans, &receipt).unwrap();

        assert_eq!(beans.current_stock, dec("2.5"));
        // (2000 * 0.02 + 500 * 0.03) / 2500 = 0.022 per g = 22 per kg
        assert_eq!(beans.cost_per_unit, dec("22"));
    }

    #[test]
    fn test_receive_into_empty_stock_adopts_cost() {
        let mut beans = ingredient("0", Unit::G, "0.05", Unit::G);
        let receipt = Receipt {
            quantity: dec("1"),
            unit: Unit::Kg,
            cost_per_unit: dec("30"),
            cost_unit: Unit::Kg,
        };

        receive(&mut beans, &receipt).unwrap();

        assert_eq!(beans.current_stock, dec("1000"));
        assert_eq!(beans.cost_per_unit, dec("0.03"));
    }

    #[test]
    fn test_receive_rejects_wrong_family() {
        let mut beans = ingredient("1000", Unit::G, "0.05", Unit::G);
        let receipt = Receipt {
            quantity: dec("1"),
            unit: Unit::L,
            cost_per_unit: dec("1"),
            cost_unit: Unit::L,
        };

        assert!(matches!(
            receive(&mut beans, &receipt),
            Err(DomainError::UnitFamilyMismatch { .. })
        ));
        assert_eq!(beans.current_stock, dec("1000"));
    }

    #[test]
    fn test_revert_single_receipt_is_exact() {
        let mut beans = ingredient("1000", Unit::G, "0.05", Unit::G);
        let receipt = Receipt {
            quantity: dec("500"),
            unit: Unit::G,
            cost_per_unit: dec("0.08"),
            cost_unit: Unit::G,
        };

        receive(&mut beans, &receipt).unwrap();
        revert_receipt(&mut beans, &receipt).unwrap();

        assert_eq!(beans.current_stock, dec("1000"));
        assert_eq!(beans.cost_per_unit, dec("0.05"));
    }

    #[test]
    fn test_revert_rejects_when_stock_already_consumed() {
        let mut beans = ingredient("200", Unit::G, "0.06", Unit::G);
        let receipt = Receipt {
            quantity: dec("500"),
            unit: Unit::G,
            cost_per_unit: dec("0.08"),
            cost_unit: Unit::G,
        };

        let err = revert_receipt(&mut beans, &receipt).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));
        assert_eq!(beans.current_stock, dec("200"));
    }

    #[test]
    fn test_revert_to_empty_keeps_cost() {
        let mut beans = ingredient("500", Unit::G, "0.08", Unit::G);
        let receipt = Receipt {
            quantity: dec("500"),
            unit: Unit::G,
            cost_per_unit: dec("0.08"),
            cost_unit: Unit::G,
        };

        revert_receipt(&mut beans, &receipt).unwrap();
        assert_eq!(beans.current_stock, Decimal::ZERO);
        assert_eq!(beans.cost_per_unit, dec("0.08"));
    }

    #[test]
    fn test_requirements_merge_shared_ingredients() {
        let beans = ingredient("1000", Unit::G, "0.05", Unit::G);
        let lines = vec![line(&beans, "18"), line(&beans, "2")];

        let reqs = sale_requirements(&lines, 3);
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].base_quantity, dec("60"));
    }

    #[test]
    fn test_deduction_exact_stock_reaches_zero() {
        let beans = ingredient("0.036", Unit::Kg, "20", Unit::Kg);
        let lines = vec![line(&beans, "18")];
        let map: HashMap<_, _> = [(beans.id, beans.clone())].into_iter().collect();

        let changes = plan_deduction(&sale_requirements(&lines, 2), &map).unwrap();
        assert_eq!(changes, vec![StockChange { ingredient_id: beans.id, new_stock: Decimal::ZERO }]);
    }

    #[test]
    fn test_deduction_reports_shortfall() {
        let beans = ingredient("36", Unit::G, "0.02", Unit::G);
        let lines = vec![line(&beans, "18")];
        let map: HashMap<_, _> = [(beans.id, beans.clone())].into_iter().collect();

        let err = plan_deduction(&sale_requirements(&lines, 3), &map).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                ingredient: "Espresso Beans".to_string(),
                required: dec("54"),
                available: dec("36"),
                shortfall: dec("18"),
                unit: Unit::G,
            }
        );
    }

    #[test]
    fn test_restoration_adds_back() {
        let beans = ingredient("0.5", Unit::Kg, "20", Unit::Kg);
        let map: HashMap<_, _> = [(beans.id, beans.clone())].into_iter().collect();
        let reqs = vec![StockRequirement { ingredient_id: beans.id, base_quantity: dec("36") }];

        let changes = plan_restoration(&reqs, &map);
        assert_eq!(changes[0].new_stock, dec("0.536"));
    }
}
