//! Ingredient category management

use serde::Deserialize;
use shared::validation::require_non_blank;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{CategoryRow, IngredientCategory};

#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
}

impl CategoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<IngredientCategory>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name FROM ingredient_categories ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(IngredientCategory::from).collect())
    }

    pub async fn create(&self, input: CategoryInput) -> AppResult<IngredientCategory> {
        require_non_blank("name", &input.name)?;
        let name = input.name.trim();

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM ingredient_categories WHERE name = $1)",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO ingredient_categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(category_id = %row.id, name = %row.name, "Category created");
        Ok(row.into())
    }

    pub async fn rename(&self, id: Uuid, input: CategoryInput) -> AppResult<IngredientCategory> {
        require_non_blank("name", &input.name)?;
        let name = input.name.trim();

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM ingredient_categories WHERE name = $1 AND id <> $2)",
        )
        .bind(name)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE ingredient_categories SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        Ok(row.into())
    }

    /// Delete a category that no ingredient uses
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let in_use = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ingredients WHERE category_id = $1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if in_use > 0 {
            return Err(AppError::conflict(
                "category",
                format!("Category is used by {} ingredient(s)", in_use),
            ));
        }

        let result = sqlx::query("DELETE FROM ingredient_categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        tx.commit().await?;
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
