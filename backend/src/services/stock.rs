//! Stock receipts: recording deliveries and reversing them

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::stock::{receive, revert_receipt, Receipt};
use shared::types::round_quantity;
use shared::validation::parse_unit;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{convert_rows, IngredientView, StockUpdate, StockUpdateRow};
use crate::services::ingredient::{lock_ingredients, save_stock};

#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StockUpdateInput {
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
    pub unit: String,
    pub cost_per_unit: Decimal,
    /// Defaults to `unit`
    pub cost_unit: Option<String>,
    pub date: Option<DateTime<Utc>>,
    #[validate(length(max = 1000, message = "Notes are too long"))]
    pub notes: Option<String>,
}

/// A recorded receipt and the ingredient it changed
#[derive(Debug, Serialize)]
pub struct StockReceiptResult {
    pub stock_update: StockUpdate,
    pub ingredient: IngredientView,
}

const STOCK_UPDATE_SELECT: &str = r#"
    SELECT su.id, su.ingredient_id, i.name AS ingredient_name, su.quantity, su.unit,
           su.cost_per_unit, su.cost_unit, su.total_cost, su.date, su.notes
    FROM stock_updates su
    JOIN ingredients i ON i.id = su.ingredient_id
"#;

impl StockService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All receipts, newest first
    pub async fn list(&self) -> AppResult<Vec<StockUpdate>> {
        let rows = sqlx::query_as::<_, StockUpdateRow>(&format!(
            "{} ORDER BY su.date DESC, su.id",
            STOCK_UPDATE_SELECT
        ))
        .fetch_all(&self.db)
        .await?;

        convert_rows(rows)
    }

    /// Receive stock and blend its cost into the ingredient
    pub async fn create(&self, input: StockUpdateInput) -> AppResult<StockReceiptResult> {
        let unit = parse_unit("unit", &input.unit)?;
        let cost_unit = match input.cost_unit.as_deref() {
            Some(value) => parse_unit("cost_unit", value)?,
            None => unit,
        };
        let receipt = Receipt {
            quantity: round_quantity(input.quantity),
            unit,
            cost_per_unit: round_quantity(input.cost_per_unit),
            cost_unit,
        };
        receipt.validate()?;

        let mut tx = self.db.begin().await?;

        let mut ingredient = lock_ingredients(&mut tx, &[input.ingredient_id])
            .await?
            .remove(&input.ingredient_id)
            .ok_or_else(|| AppError::NotFound(format!("Ingredient {}", input.ingredient_id)))?;

        receive(&mut ingredient, &receipt)?;
        save_stock(&mut tx, &ingredient).await?;

        let row = sqlx::query_as::<_, StockUpdateRow>(
            r#"
            WITH inserted AS (
                INSERT INTO stock_updates
                    (ingredient_id, quantity, unit, cost_per_unit, cost_unit, total_cost, date, notes)
                VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()), $8)
                RETURNING *
            )
            SELECT su.id, su.ingredient_id, $9::TEXT AS ingredient_name, su.quantity, su.unit,
                   su.cost_per_unit, su.cost_unit, su.total_cost, su.date, su.notes
            FROM inserted su
            "#,
        )
        .bind(ingredient.id)
        .bind(receipt.quantity)
        .bind(receipt.unit.as_str())
        .bind(receipt.cost_per_unit)
        .bind(receipt.cost_unit.as_str())
        .bind(receipt.total_cost())
        .bind(input.date)
        .bind(&input.notes)
        .bind(&ingredient.name)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            ingredient_id = %ingredient.id,
            quantity = %receipt.quantity,
            unit = receipt.unit.as_str(),
            new_stock = %ingredient.current_stock,
            new_cost = %ingredient.cost_per_unit,
            "Stock received"
        );

        Ok(StockReceiptResult {
            stock_update: StockUpdate::try_from(row)?,
            ingredient: IngredientView::from(ingredient),
        })
    }

    /// Delete a receipt and take its quantity back out of stock
    pub async fn delete(&self, id: Uuid) -> AppResult<IngredientView> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, StockUpdateRow>(&format!(
            "{} WHERE su.id = $1 FOR UPDATE OF su",
            STOCK_UPDATE_SELECT
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Stock update {}", id)))?;
        let update = StockUpdate::try_from(row)?;

        let mut ingredient = lock_ingredients(&mut tx, &[update.ingredient_id])
            .await?
            .remove(&update.ingredient_id)
            .ok_or_else(|| AppError::NotFound(format!("Ingredient {}", update.ingredient_id)))?;

        let receipt = Receipt {
            quantity: update.quantity,
            unit: update.unit,
            cost_per_unit: update.cost_per_unit,
            cost_unit: update.cost_unit,
        };
        revert_receipt(&mut ingredient, &receipt)?;
        save_stock(&mut tx, &ingredient).await?;

        sqlx::query("DELETE FROM stock_updates WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            stock_update_id = %id,
            ingredient_id = %ingredient.id,
            new_stock = %ingredient.current_stock,
            new_cost = %ingredient.cost_per_unit,
            "Stock receipt reversed"
        );

        Ok(IngredientView::from(ingredient))
    }
}
