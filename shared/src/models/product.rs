//! Product and recipe models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::costing::{self, ProfitSummary};
use crate::types::round_money;
use crate::units::Unit;

/// A product on the menu
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub selling_price: Decimal,
    pub category: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One ingredient line of a product recipe.
///
/// `quantity` is stored in the ingredient's base unit (g or ml) for one
/// unit of product; `entry_quantity`/`entry_unit` keep what was typed.
/// The ingredient's cost basis is joined in at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub quantity: Decimal,
    pub base_unit: Unit,
    pub entry_quantity: Decimal,
    pub entry_unit: Unit,
    pub ingredient_cost_per_unit: Decimal,
    pub ingredient_cost_unit: Unit,
}

impl RecipeLine {
    /// Ingredient cost of one unit of product for this line
    pub fn cost(&self) -> Decimal {
        costing::line_cost(
            self.ingredient_cost_per_unit,
            self.ingredient_cost_unit,
            self.quantity,
            self.base_unit,
        )
    }
}

/// A product together with its recipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductWithRecipe {
    #[serde(flatten)]
    pub product: Product,
    pub ingredients: Vec<RecipeLine>,
}

impl ProductWithRecipe {
    /// Unrounded ingredient cost of one unit; zero without recipe lines
    pub fn cost(&self) -> Decimal {
        costing::total_cost(self.ingredients.iter().map(RecipeLine::cost))
    }

    pub fn profit(&self) -> ProfitSummary {
        costing::profit(self.product.selling_price, self.cost())
    }

    pub fn into_view(self) -> ProductView {
        let total_cost = self.cost();
        let profit = self.profit();
        let ingredients = self
            .ingredients
            .into_iter()
            .map(|line| {
                let cost = round_money(line.cost());
                RecipeLineView { line, cost }
            })
            .collect();

        ProductView {
            product: self.product,
            ingredients,
            total_cost: round_money(total_cost),
            profit,
        }
    }
}

/// Recipe line with its cost, for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeLineView {
    #[serde(flatten)]
    pub line: RecipeLine,
    pub cost: Decimal,
}

/// Product as returned by list/get endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub ingredients: Vec<RecipeLineView>,
    pub total_cost: Decimal,
    pub profit: ProfitSummary,
}
