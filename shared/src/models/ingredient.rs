//! Ingredient inventory models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::costing;
use crate::units::{to_base, Unit};

/// Ingredient category (e.g. "Coffee Beans", "Milk & Dairy")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngredientCategory {
    pub id: Uuid,
    pub name: String,
}

/// A tracked ingredient with its stock level and cost basis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub current_stock: Decimal,
    pub stock_unit: Unit,
    pub min_threshold: Decimal,
    pub threshold_unit: Unit,
    /// Cost per one `cost_unit`
    pub cost_per_unit: Decimal,
    pub cost_unit: Unit,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    pub fn stock_in_base_unit(&self) -> Decimal {
        to_base(self.current_stock, self.stock_unit)
    }

    pub fn threshold_in_base_unit(&self) -> Decimal {
        to_base(self.min_threshold, self.threshold_unit)
    }

    /// Stock at or below the minimum threshold, compared in base units
    pub fn is_low_stock(&self) -> bool {
        is_low_stock_level(self.current_stock, self.stock_unit, self.min_threshold, self.threshold_unit)
    }

    pub fn cost_per_base_unit(&self) -> Decimal {
        costing::cost_per_base_unit(self.cost_per_unit, self.cost_unit)
    }

    /// Cost of using `quantity` of this ingredient expressed in `unit`
    pub fn line_cost(&self, quantity: Decimal, unit: Unit) -> Decimal {
        costing::line_cost(self.cost_per_unit, self.cost_unit, quantity, unit)
    }
}

/// Ingredient as returned by list/get endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientView {
    #[serde(flatten)]
    pub ingredient: Ingredient,
    pub low_stock: bool,
}

impl From<Ingredient> for IngredientView {
    fn from(ingredient: Ingredient) -> Self {
        let low_stock = ingredient.is_low_stock();
        Self {
            ingredient,
            low_stock,
        }
    }
}

/// Low-stock alert entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LowStockAlert {
    pub id: Uuid,
    pub name: String,
    pub current_stock: Decimal,
    pub min_threshold: Decimal,
    pub unit: Unit,
    pub threshold_unit: Unit,
}

impl From<&Ingredient> for LowStockAlert {
    fn from(i: &Ingredient) -> Self {
        Self {
            id: i.id,
            name: i.name.clone(),
            current_stock: i.current_stock,
            min_threshold: i.min_threshold,
            unit: i.stock_unit,
            threshold_unit: i.threshold_unit,
        }
    }
}

/// Whether `stock` is at or below `threshold`, each in its own unit
pub fn is_low_stock_level(stock: Decimal, stock_unit: Unit, threshold: Decimal, threshold_unit: Unit) -> bool {
    to_base(stock, stock_unit) <= to_base(threshold, threshold_unit)
}

/// Filter a set of ingredients down to low-stock alerts
pub fn low_stock_alerts<'a>(ingredients: impl IntoIterator<Item = &'a Ingredient>) -> Vec<LowStockAlert> {
    ingredients
        .into_iter()
        .filter(|i| i.is_low_stock())
        .map(LowStockAlert::from)
        .collect()
}

/// A stock receipt event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockUpdate {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub quantity: Decimal,
    pub unit: Unit,
    /// Cost per one `cost_unit` at receipt
    pub cost_per_unit: Decimal,
    pub cost_unit: Unit,
    pub total_cost: Decimal,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}
