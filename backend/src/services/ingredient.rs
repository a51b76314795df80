//! Ingredient catalogue and low-stock alerts

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::stock::StockChange;
use shared::types::round_quantity;
use shared::validation::{ingredient_units, require_non_blank, require_non_negative};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    convert_rows, low_stock_alerts, Ingredient, IngredientRow, IngredientView, LowStockAlert,
    INGREDIENT_SELECT,
};

#[derive(Clone)]
pub struct IngredientService {
    db: PgPool,
}

/// Body of ingredient create and update requests
#[derive(Debug, Deserialize, Validate)]
pub struct IngredientInput {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub category_id: Uuid,
    pub current_stock: Decimal,
    pub stock_unit: String,
    pub min_threshold: Decimal,
    pub threshold_unit: String,
    pub cost_per_unit: Decimal,
    pub cost_unit: Option<String>,
}

/// Load ingredients by id and lock their rows for the rest of the
/// transaction. Rows are locked in id order.
pub(crate) async fn lock_ingredients(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Ingredient>> {
    let rows = sqlx::query_as::<_, IngredientRow>(&format!(
        "{} WHERE i.id = ANY($1) ORDER BY i.id FOR UPDATE OF i",
        INGREDIENT_SELECT
    ))
    .bind(ids)
    .fetch_all(&mut *conn)
    .await?;

    let ingredients: Vec<Ingredient> = convert_rows(rows)?;
    Ok(ingredients.into_iter().map(|i| (i.id, i)).collect())
}

/// Write back stock level and cost of an ingredient
pub(crate) async fn save_stock(conn: &mut PgConnection, ingredient: &Ingredient) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE ingredients
        SET current_stock = $2, cost_per_unit = $3, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(ingredient.id)
    .bind(ingredient.current_stock)
    .bind(ingredient.cost_per_unit)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Set new stock levels planned by the stock ledger
pub(crate) async fn apply_stock_changes(conn: &mut PgConnection, changes: &[StockChange]) -> AppResult<()> {
    for change in changes {
        sqlx::query("UPDATE ingredients SET current_stock = $2, updated_at = NOW() WHERE id = $1")
            .bind(change.ingredient_id)
            .bind(change.new_stock)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

impl IngredientService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All ingredients ordered by category then name
    pub async fn list(&self) -> AppResult<Vec<IngredientView>> {
        let rows = sqlx::query_as::<_, IngredientRow>(&format!(
            "{} ORDER BY c.name, i.name",
            INGREDIENT_SELECT
        ))
        .fetch_all(&self.db)
        .await?;

        let ingredients: Vec<Ingredient> = convert_rows(rows)?;
        Ok(ingredients.into_iter().map(IngredientView::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<IngredientView> {
        self.fetch(id).await.map(IngredientView::from)
    }

    async fn fetch(&self, id: Uuid) -> AppResult<Ingredient> {
        let row = sqlx::query_as::<_, IngredientRow>(&format!("{} WHERE i.id = $1", INGREDIENT_SELECT))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ingredient {}", id)))?;

        Ingredient::try_from(row)
    }

    pub async fn create(&self, input: IngredientInput) -> AppResult<IngredientView> {
        let values = IngredientValues::resolve(&input)?;
        self.ensure_category(input.category_id).await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO ingredients
                (name, category_id, current_stock, stock_unit, min_threshold,
                 threshold_unit, cost_per_unit, cost_unit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.category_id)
        .bind(values.current_stock)
        .bind(values.stock_unit.as_str())
        .bind(values.min_threshold)
        .bind(values.threshold_unit.as_str())
        .bind(values.cost_per_unit)
        .bind(values.cost_unit.as_str())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(ingredient_id = %id, name = %input.name.trim(), "Ingredient created");
        self.get(id).await
    }

    /// Replace an ingredient's fields. Moving the stock unit to another
    /// family is refused while recipes, sales or stock updates refer to it.
    pub async fn update(&self, id: Uuid, input: IngredientInput) -> AppResult<IngredientView> {
        let values = IngredientValues::resolve(&input)?;
        self.ensure_category(input.category_id).await?;

        let mut tx = self.db.begin().await?;

        let current = lock_ingredients(&mut tx, &[id])
            .await?
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Ingredient {}", id)))?;

        if !current.stock_unit.same_family(values.stock_unit) {
            let references = sqlx::query_scalar::<_, i64>(
                r#"
                SELECT (SELECT COUNT(*) FROM product_ingredients WHERE ingredient_id = $1)
                     + (SELECT COUNT(*) FROM sale_stock_movements WHERE ingredient_id = $1)
                     + (SELECT COUNT(*) FROM stock_updates WHERE ingredient_id = $1)
                "#,
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            ensure_family_change_allowed(current.stock_unit, values.stock_unit, references)?;
        }

        sqlx::query(
            r#"
            UPDATE ingredients
            SET name = $2, category_id = $3, current_stock = $4, stock_unit = $5,
                min_threshold = $6, threshold_unit = $7, cost_per_unit = $8,
                cost_unit = $9, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.category_id)
        .bind(values.current_stock)
        .bind(values.stock_unit.as_str())
        .bind(values.min_threshold)
        .bind(values.threshold_unit.as_str())
        .bind(values.cost_per_unit)
        .bind(values.cost_unit.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(ingredient_id = %id, "Ingredient updated");
        self.get(id).await
    }

    /// Delete an ingredient no recipe uses. Its stock updates go with it.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let used = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM product_ingredients WHERE ingredient_id = $1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if used > 0 {
            return Err(AppError::conflict(
                "ingredient",
                format!("Ingredient is used in {} recipe line(s)", used),
            ));
        }

        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Ingredient {}", id)));
        }

        tx.commit().await?;
        tracing::info!(ingredient_id = %id, "Ingredient deleted");
        Ok(())
    }

    /// Ingredients at or below their minimum threshold
    pub async fn low_stock_alerts(&self) -> AppResult<Vec<LowStockAlert>> {
        let rows = sqlx::query_as::<_, IngredientRow>(&format!("{} ORDER BY i.name", INGREDIENT_SELECT))
            .fetch_all(&self.db)
            .await?;

        let ingredients: Vec<Ingredient> = convert_rows(rows)?;
        Ok(low_stock_alerts(&ingredients))
    }

    async fn ensure_category(&self, category_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM ingredient_categories WHERE id = $1)",
        )
        .bind(category_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound(format!("Category {}", category_id)));
        }
        Ok(())
    }
}

/// Quantities recorded against an ingredient are in its stock family, so
/// the family is fixed once anything refers to it
fn ensure_family_change_allowed(
    current: shared::Unit,
    requested: shared::Unit,
    references: i64,
) -> AppResult<()> {
    if current.same_family(requested) || references == 0 {
        return Ok(());
    }
    Err(AppError::conflict(
        "stock_unit",
        "Cannot change the unit family of an ingredient with recipes, sales or stock updates",
    ))
}

/// Checked and normalised ingredient fields
struct IngredientValues {
    current_stock: Decimal,
    stock_unit: shared::Unit,
    min_threshold: Decimal,
    threshold_unit: shared::Unit,
    cost_per_unit: Decimal,
    cost_unit: shared::Unit,
}

impl IngredientValues {
    fn resolve(input: &IngredientInput) -> AppResult<Self> {
        require_non_blank("name", &input.name)?;
        require_non_negative("current_stock", input.current_stock)?;
        require_non_negative("min_threshold", input.min_threshold)?;
        require_non_negative("cost_per_unit", input.cost_per_unit)?;

        let (stock_unit, threshold_unit, cost_unit) = ingredient_units(
            &input.stock_unit,
            &input.threshold_unit,
            input.cost_unit.as_deref(),
        )?;

        Ok(Self {
            current_stock: round_quantity(input.current_stock),
            stock_unit,
            min_threshold: round_quantity(input.min_threshold),
            threshold_unit,
            cost_per_unit: round_quantity(input.cost_per_unit),
            cost_unit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Unit;

    #[test]
    fn test_family_change_blocked_by_recorded_history() {
        assert!(ensure_family_change_allowed(Unit::G, Unit::Ml, 0).is_ok());
        assert!(ensure_family_change_allowed(Unit::G, Unit::Kg, 5).is_ok());

        // an old sale or receipt in grams still refers to the ingredient
        let err = ensure_family_change_allowed(Unit::G, Unit::Ml, 1).unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }
}
