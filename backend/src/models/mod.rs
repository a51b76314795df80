//! Database models for the coffee shop server
//!
//! Re-exports models from the shared crate and adds the row types the
//! services read from PostgreSQL. Unit and enum columns are stored as text
//! and parsed back into the shared types here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

pub use shared::models::*;
use shared::Unit;

use crate::error::{AppError, AppResult};

/// Ingredient columns joined with the category name
pub const INGREDIENT_SELECT: &str = r#"
    SELECT i.id, i.name, i.category_id, c.name AS category_name,
           i.current_stock, i.stock_unit, i.min_threshold, i.threshold_unit,
           i.cost_per_unit, i.cost_unit, i.created_at, i.updated_at
    FROM ingredients i
    JOIN ingredient_categories c ON c.id = i.category_id
"#;

/// Recipe line columns joined with the ingredient's current cost basis
pub const RECIPE_LINE_SELECT: &str = r#"
    SELECT pi.id, pi.product_id, pi.ingredient_id, i.name AS ingredient_name,
           pi.quantity, i.stock_unit, pi.entry_quantity, pi.entry_unit,
           i.cost_per_unit, i.cost_unit
    FROM product_ingredients pi
    JOIN ingredients i ON i.id = pi.ingredient_id
"#;

/// Sale columns joined with the product name
pub const SALE_SELECT: &str = r#"
    SELECT s.id, s.date, s.product_id, p.name AS product_name, s.quantity,
           s.recorded_revenue, s.recorded_cost, s.created_at
    FROM sales s
    JOIN products p ON p.id = s.product_id
"#;

fn stored_unit(column: &str, value: &str) -> AppResult<Unit> {
    value
        .parse::<Unit>()
        .map_err(|_| AppError::Internal(format!("Invalid unit '{}' stored in {}", value, column)))
}

#[derive(Debug, FromRow)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
}

impl From<CategoryRow> for IngredientCategory {
    fn from(row: CategoryRow) -> Self {
        IngredientCategory {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct IngredientRow {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub current_stock: Decimal,
    pub stock_unit: String,
    pub min_threshold: Decimal,
    pub threshold_unit: String,
    pub cost_per_unit: Decimal,
    pub cost_unit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<IngredientRow> for Ingredient {
    type Error = AppError;

    fn try_from(row: IngredientRow) -> AppResult<Self> {
        Ok(Ingredient {
            id: row.id,
            name: row.name,
            category_id: row.category_id,
            category_name: row.category_name,
            current_stock: row.current_stock,
            stock_unit: stored_unit("ingredients.stock_unit", &row.stock_unit)?,
            min_threshold: row.min_threshold,
            threshold_unit: stored_unit("ingredients.threshold_unit", &row.threshold_unit)?,
            cost_per_unit: row.cost_per_unit,
            cost_unit: stored_unit("ingredients.cost_unit", &row.cost_unit)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct StockUpdateRow {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub cost_per_unit: Decimal,
    pub cost_unit: String,
    pub total_cost: Decimal,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl TryFrom<StockUpdateRow> for StockUpdate {
    type Error = AppError;

    fn try_from(row: StockUpdateRow) -> AppResult<Self> {
        Ok(StockUpdate {
            id: row.id,
            ingredient_id: row.ingredient_id,
            ingredient_name: row.ingredient_name,
            quantity: row.quantity,
            unit: stored_unit("stock_updates.unit", &row.unit)?,
            cost_per_unit: row.cost_per_unit,
            cost_unit: stored_unit("stock_updates.cost_unit", &row.cost_unit)?,
            total_cost: row.total_cost,
            date: row.date,
            notes: row.notes,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub selling_price: Decimal,
    pub category: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            selling_price: row.selling_price,
            category: row.category,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct RecipeLineRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub quantity: Decimal,
    pub stock_unit: String,
    pub entry_quantity: Decimal,
    pub entry_unit: String,
    pub cost_per_unit: Decimal,
    pub cost_unit: String,
}

impl TryFrom<RecipeLineRow> for RecipeLine {
    type Error = AppError;

    fn try_from(row: RecipeLineRow) -> AppResult<Self> {
        Ok(RecipeLine {
            id: row.id,
            product_id: row.product_id,
            ingredient_id: row.ingredient_id,
            ingredient_name: row.ingredient_name,
            quantity: row.quantity,
            base_unit: stored_unit("ingredients.stock_unit", &row.stock_unit)?.base(),
            entry_quantity: row.entry_quantity,
            entry_unit: stored_unit("product_ingredients.entry_unit", &row.entry_unit)?,
            ingredient_cost_per_unit: row.cost_per_unit,
            ingredient_cost_unit: stored_unit("ingredients.cost_unit", &row.cost_unit)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SaleRow {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub recorded_revenue: Decimal,
    pub recorded_cost: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Sale {
            id: row.id,
            date: row.date,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            recorded_revenue: row.recorded_revenue,
            recorded_cost: row.recorded_cost,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct FinanceRow {
    pub starting_balance: Decimal,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub current_balance: Decimal,
}

impl From<FinanceRow> for FinanceOverview {
    fn from(row: FinanceRow) -> Self {
        FinanceOverview {
            starting_balance: row.starting_balance,
            total_income: row.total_income,
            total_expenses: row.total_expenses,
            current_balance: row.current_balance,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct CashTransactionRow {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub transaction_type: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub balance_after: Decimal,
    pub sale_id: Option<Uuid>,
}

impl TryFrom<CashTransactionRow> for CashTransaction {
    type Error = AppError;

    fn try_from(row: CashTransactionRow) -> AppResult<Self> {
        let transaction_type = CashTransactionType::from_str(&row.transaction_type).ok_or_else(|| {
            AppError::Internal(format!(
                "Invalid transaction type '{}' stored in cash_transactions",
                row.transaction_type
            ))
        })?;

        Ok(CashTransaction {
            id: row.id,
            date: row.date,
            transaction_type,
            amount: row.amount,
            note: row.note,
            balance_after: row.balance_after,
            sale_id: row.sale_id,
        })
    }
}

/// Convert a batch of rows, failing on the first bad one
pub fn convert_rows<R, T>(rows: Vec<R>) -> AppResult<Vec<T>>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}
