//! Menu products and their recipes

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::costing::recipe_base_quantity;
use shared::types::{round_money, round_quantity};
use shared::validation::{parse_unit, require_non_blank, require_non_negative};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    convert_rows, Product, ProductRow, ProductView, ProductWithRecipe, RecipeLine, RecipeLineRow,
    RECIPE_LINE_SELECT,
};

#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct RecipeLineInput {
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
    pub unit: String,
}

/// Body of product create and update requests. An update replaces the
/// whole recipe.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub selling_price: Decimal,
    #[validate(length(min = 1, max = 255, message = "Category is required"))]
    pub category: String,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub ingredients: Vec<RecipeLineInput>,
}

/// A recipe line ready to insert
struct ResolvedLine {
    ingredient_id: Uuid,
    base_quantity: Decimal,
    entry_quantity: Decimal,
    entry_unit: shared::Unit,
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, selling_price, category, is_active, created_at, updated_at";

/// Load a product with its recipe and the current ingredient costs
pub(crate) async fn load_product(conn: &mut PgConnection, id: Uuid) -> AppResult<ProductWithRecipe> {
    let product = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {} FROM products WHERE id = $1",
        PRODUCT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product {}", id)))?;

    let rows = sqlx::query_as::<_, RecipeLineRow>(&format!(
        "{} WHERE pi.product_id = $1 ORDER BY i.name, pi.id",
        RECIPE_LINE_SELECT
    ))
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(ProductWithRecipe {
        product: Product::from(product),
        ingredients: convert_rows(rows)?,
    })
}

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All products with recipe, cost and profit
    pub async fn list(&self) -> AppResult<Vec<ProductView>> {
        let products = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY category, name",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, RecipeLineRow>(&format!(
            "{} ORDER BY i.name, pi.id",
            RECIPE_LINE_SELECT
        ))
        .fetch_all(&self.db)
        .await?;
        let lines: Vec<RecipeLine> = convert_rows(rows)?;

        let mut by_product: HashMap<Uuid, Vec<RecipeLine>> = HashMap::new();
        for line in lines {
            by_product.entry(line.product_id).or_default().push(line);
        }

        Ok(products
            .into_iter()
            .map(|row| {
                let ingredients = by_product.remove(&row.id).unwrap_or_default();
                ProductWithRecipe {
                    product: Product::from(row),
                    ingredients,
                }
                .into_view()
            })
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ProductView> {
        let mut conn = self.db.acquire().await?;
        Ok(load_product(&mut conn, id).await?.into_view())
    }

    /// Distinct category labels in use
    pub async fn categories(&self) -> AppResult<Vec<String>> {
        let categories = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM products ORDER BY category",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    pub async fn create(&self, input: ProductInput) -> AppResult<ProductView> {
        Self::check_fields(&input)?;

        let mut tx = self.db.begin().await?;
        let lines = Self::resolve_lines(&mut tx, &input.ingredients).await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products (name, description, selling_price, category, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(round_money(input.selling_price))
        .bind(input.category.trim())
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_lines(&mut tx, id, &lines).await?;
        let product = load_product(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(product_id = %id, lines = lines.len(), "Product created");
        Ok(product.into_view())
    }

    /// Replace a product's fields and recipe in one transaction
    pub async fn update(&self, id: Uuid, input: ProductInput) -> AppResult<ProductView> {
        Self::check_fields(&input)?;

        let mut tx = self.db.begin().await?;
        let lines = Self::resolve_lines(&mut tx, &input.ingredients).await?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, selling_price = $4, category = $5,
                is_active = COALESCE($6, is_active), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(round_money(input.selling_price))
        .bind(input.category.trim())
        .bind(input.is_active)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {}", id)));
        }

        sqlx::query("DELETE FROM product_ingredients WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::insert_lines(&mut tx, id, &lines).await?;

        let product = load_product(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(product_id = %id, lines = lines.len(), "Product updated");
        Ok(product.into_view())
    }

    /// Delete a product that has never been sold
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let sold = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales WHERE product_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if sold > 0 {
            return Err(AppError::conflict(
                "product",
                "Product has recorded sales; deactivate it instead",
            ));
        }

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {}", id)));
        }

        tx.commit().await?;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    fn check_fields(input: &ProductInput) -> AppResult<()> {
        require_non_blank("name", &input.name)?;
        require_non_blank("category", &input.category)?;
        require_non_negative("selling_price", input.selling_price)?;
        Ok(())
    }

    /// Check every line against its ingredient and convert it to base units
    async fn resolve_lines(
        conn: &mut PgConnection,
        inputs: &[RecipeLineInput],
    ) -> AppResult<Vec<ResolvedLine>> {
        let mut lines = Vec::with_capacity(inputs.len());

        for input in inputs {
            let stock_unit = sqlx::query_scalar::<_, String>(
                "SELECT stock_unit FROM ingredients WHERE id = $1",
            )
            .bind(input.ingredient_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ingredient {}", input.ingredient_id)))?;

            let stock_unit = stock_unit
                .parse::<shared::Unit>()
                .map_err(|_| AppError::Internal(format!("Invalid unit '{}' stored in ingredients", stock_unit)))?;
            let entry_unit = parse_unit("unit", &input.unit)?;
            let base_quantity = recipe_base_quantity(input.quantity, entry_unit, stock_unit)?;

            lines.push(ResolvedLine {
                ingredient_id: input.ingredient_id,
                base_quantity,
                entry_quantity: round_quantity(input.quantity),
                entry_unit,
            });
        }

        Ok(lines)
    }

    async fn insert_lines(conn: &mut PgConnection, product_id: Uuid, lines: &[ResolvedLine]) -> AppResult<()> {
        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO product_ingredients
                    (product_id, ingredient_id, quantity, entry_quantity, entry_unit)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(product_id)
            .bind(line.ingredient_id)
            .bind(line.base_quantity)
            .bind(line.entry_quantity)
            .bind(line.entry_unit.as_str())
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}
