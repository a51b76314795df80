//! Sales: recording a sale consumes stock and books revenue; deleting one
//! gives both back

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::stock::{plan_deduction, plan_restoration, sale_requirements, StockRequirement};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    convert_rows, CashTransaction, Product, ProductRow, ProductWithRecipe, RecipeLine,
    RecipeLineRow, Sale, SaleMetrics, SaleRow, SaleView, RECIPE_LINE_SELECT, SALE_SELECT,
};
use crate::services::finance::{append_transaction, lock_overview, save_overview};
use crate::services::ingredient::{apply_stock_changes, lock_ingredients};
use crate::services::product::load_product;

#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
    starting_balance: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaleInput {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be a positive whole number"))]
    pub quantity: i32,
    /// Defaults to now
    pub date: Option<DateTime<Utc>>,
}

/// What deleting a sale reversed
#[derive(Debug, Serialize)]
pub struct SaleReversal {
    pub sale_id: Uuid,
    pub restored_ingredients: usize,
    pub cash_transaction: CashTransaction,
}

#[derive(Debug, FromRow)]
struct MovementRow {
    ingredient_id: Uuid,
    base_quantity: Decimal,
}

impl SaleService {
    pub fn new(db: PgPool, starting_balance: Decimal) -> Self {
        Self {
            db,
            starting_balance,
        }
    }

    /// All sales, newest first, with metrics at current product cost
    pub async fn list(&self) -> AppResult<Vec<SaleView>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!("{} ORDER BY s.date DESC, s.id", SALE_SELECT))
            .fetch_all(&self.db)
            .await?;
        let sales: Vec<Sale> = rows.into_iter().map(Sale::from).collect();

        let mut conn = self.db.acquire().await?;
        let metrics = current_sale_metrics(&mut conn, &sales).await?;

        Ok(sales
            .into_iter()
            .map(|sale| {
                let m = metrics.get(&sale.id).copied().unwrap_or_default();
                SaleView::new(sale, m)
            })
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<SaleView> {
        let mut conn = self.db.acquire().await?;

        let sale = sqlx::query_as::<_, SaleRow>(&format!("{} WHERE s.id = $1", SALE_SELECT))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .map(Sale::from)
            .ok_or_else(|| AppError::NotFound(format!("Sale {}", id)))?;

        let product = load_product(&mut conn, sale.product_id).await?;
        let metrics = product.sale_metrics(sale.quantity);
        Ok(SaleView::new(sale, metrics))
    }

    /// Record a sale: deduct every ingredient the recipe needs, book the
    /// revenue and append a cash transaction, all or nothing
    pub async fn create(&self, input: SaleInput) -> AppResult<SaleView> {
        if input.quantity <= 0 {
            return Err(AppError::validation(
                "quantity",
                "Quantity must be a positive whole number",
            ));
        }

        let mut tx = self.db.begin().await?;

        let mut product = load_product(&mut tx, input.product_id).await?;
        if !product.product.is_active {
            return Err(AppError::conflict("product", "Product is not active"));
        }

        let requirements = sale_requirements(&product.ingredients, input.quantity);
        let ids: Vec<Uuid> = requirements.iter().map(|r| r.ingredient_id).collect();
        let ingredients = lock_ingredients(&mut tx, &ids).await?;

        let changes = plan_deduction(&requirements, &ingredients)?;

        // Cost the sale at the locked ingredient costs
        for line in product.ingredients.iter_mut() {
            if let Some(ingredient) = ingredients.get(&line.ingredient_id) {
                line.ingredient_cost_per_unit = ingredient.cost_per_unit;
                line.ingredient_cost_unit = ingredient.cost_unit;
            }
        }
        let metrics = product.sale_metrics(input.quantity);

        apply_stock_changes(&mut tx, &changes).await?;

        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            WITH inserted AS (
                INSERT INTO sales (date, product_id, quantity, recorded_revenue, recorded_cost)
                VALUES (COALESCE($1, NOW()), $2, $3, $4, $5)
                RETURNING *
            )
            SELECT s.id, s.date, s.product_id, $6::TEXT AS product_name, s.quantity,
                   s.recorded_revenue, s.recorded_cost, s.created_at
            FROM inserted s
            "#,
        )
        .bind(input.date)
        .bind(product.product.id)
        .bind(input.quantity)
        .bind(metrics.revenue)
        .bind(metrics.cost)
        .bind(&product.product.name)
        .fetch_one(&mut *tx)
        .await?;
        let sale = Sale::from(row);

        record_movements(&mut tx, sale.id, &requirements).await?;

        let mut overview = lock_overview(&mut tx, self.starting_balance).await?;
        let movement = overview.record_sale(sale.id, &metrics);
        save_overview(&mut tx, &overview).await?;
        append_transaction(&mut tx, &movement).await?;

        tx.commit().await?;

        tracing::info!(
            sale_id = %sale.id,
            product_id = %sale.product_id,
            quantity = sale.quantity,
            revenue = %metrics.revenue,
            cost = %metrics.cost,
            ingredients = changes.len(),
            "Sale recorded"
        );

        Ok(SaleView::new(sale, metrics))
    }

    /// Delete a sale, restoring exactly the stock it consumed and reversing
    /// exactly the figures it booked
    pub async fn delete(&self, id: Uuid) -> AppResult<SaleReversal> {
        let mut tx = self.db.begin().await?;

        let sale = sqlx::query_as::<_, SaleRow>(&format!("{} WHERE s.id = $1 FOR UPDATE OF s", SALE_SELECT))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .map(Sale::from)
            .ok_or_else(|| AppError::NotFound(format!("Sale {}", id)))?;

        let movements = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT ingredient_id, base_quantity
            FROM sale_stock_movements
            WHERE sale_id = $1
            ORDER BY ingredient_id
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let requirements: Vec<StockRequirement> = movements
            .into_iter()
            .map(|m| StockRequirement {
                ingredient_id: m.ingredient_id,
                base_quantity: m.base_quantity,
            })
            .collect();
        let ids: Vec<Uuid> = requirements.iter().map(|r| r.ingredient_id).collect();
        let ingredients = lock_ingredients(&mut tx, &ids).await?;

        let changes = plan_restoration(&requirements, &ingredients);
        apply_stock_changes(&mut tx, &changes).await?;

        let mut overview = lock_overview(&mut tx, self.starting_balance).await?;
        let movement = overview.reverse_sale(sale.id, sale.recorded_revenue, sale.recorded_cost);
        save_overview(&mut tx, &overview).await?;
        let cash_transaction = append_transaction(&mut tx, &movement).await?;

        sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            sale_id = %id,
            revenue = %sale.recorded_revenue,
            cost = %sale.recorded_cost,
            restored = changes.len(),
            "Sale deleted"
        );

        Ok(SaleReversal {
            sale_id: id,
            restored_ingredients: changes.len(),
            cash_transaction,
        })
    }
}

async fn record_movements(
    conn: &mut PgConnection,
    sale_id: Uuid,
    requirements: &[StockRequirement],
) -> AppResult<()> {
    for requirement in requirements {
        sqlx::query(
            r#"
            INSERT INTO sale_stock_movements (sale_id, ingredient_id, base_quantity)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(sale_id)
        .bind(requirement.ingredient_id)
        .bind(requirement.base_quantity)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Products with recipes for a set of ids, keyed by id
async fn load_products(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> AppResult<HashMap<Uuid, ProductWithRecipe>> {
    let products = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, name, description, selling_price, category, is_active, created_at, updated_at
        FROM products
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(&mut *conn)
    .await?;

    let rows = sqlx::query_as::<_, RecipeLineRow>(&format!(
        "{} WHERE pi.product_id = ANY($1)",
        RECIPE_LINE_SELECT
    ))
    .bind(ids)
    .fetch_all(&mut *conn)
    .await?;
    let lines: Vec<RecipeLine> = convert_rows(rows)?;

    let mut result: HashMap<Uuid, ProductWithRecipe> = products
        .into_iter()
        .map(|row| {
            let product = Product::from(row);
            (
                product.id,
                ProductWithRecipe {
                    product,
                    ingredients: Vec::new(),
                },
            )
        })
        .collect();

    for line in lines {
        if let Some(product) = result.get_mut(&line.product_id) {
            product.ingredients.push(line);
        }
    }

    Ok(result)
}

/// Revenue, cost and profit of each sale at its product's current cost
pub(crate) async fn current_sale_metrics(
    conn: &mut PgConnection,
    sales: &[Sale],
) -> AppResult<HashMap<Uuid, SaleMetrics>> {
    let product_ids: Vec<Uuid> = sales
        .iter()
        .map(|s| s.product_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let products = load_products(conn, &product_ids).await?;

    Ok(sales
        .iter()
        .map(|sale| {
            let metrics = products
                .get(&sale.product_id)
                .map(|product| product.sale_metrics(sale.quantity))
                .unwrap_or_default();
            (sale.id, metrics)
        })
        .collect())
}
