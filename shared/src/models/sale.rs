//! Sales models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::round_money;

use super::ProductWithRecipe;

/// A recorded sale.
///
/// `recorded_revenue` and `recorded_cost` are the figures booked into the
/// finance overview when the sale was created; they are what a deletion
/// reverses. Reported metrics are derived from the current product cost.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub recorded_revenue: Decimal,
    pub recorded_cost: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Revenue, cost and profit of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SaleMetrics {
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
}

impl SaleMetrics {
    /// Metrics for `quantity` units sold at `selling_price` with ingredient
    /// cost `unit_cost` per unit
    pub fn compute(selling_price: Decimal, unit_cost: Decimal, quantity: i32) -> Self {
        let quantity = Decimal::from(quantity);
        let revenue = round_money(selling_price * quantity);
        let cost = round_money(unit_cost * quantity);
        Self {
            revenue,
            cost,
            profit: revenue - cost,
        }
    }
}

impl ProductWithRecipe {
    /// Metrics for selling `quantity` units at the current cost
    pub fn sale_metrics(&self, quantity: i32) -> SaleMetrics {
        SaleMetrics::compute(self.product.selling_price, self.cost(), quantity)
    }
}

/// Sale as returned by list/get endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleView {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    #[serde(flatten)]
    pub metrics: SaleMetrics,
}

impl SaleView {
    pub fn new(sale: Sale, metrics: SaleMetrics) -> Self {
        Self {
            id: sale.id,
            date: sale.date,
            product_id: sale.product_id,
            product_name: sale.product_name,
            quantity: sale.quantity,
            metrics,
        }
    }
}
