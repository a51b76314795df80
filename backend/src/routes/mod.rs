//! Route definitions for the coffee shop API

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes(state.clone()))
        // Everything else requires a bearer token
        .merge(protected_routes(state))
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/ingredient-categories", category_routes())
        .nest("/ingredients", ingredient_routes())
        .route("/low-stock-alerts", get(handlers::low_stock_alerts))
        .nest("/products", product_routes())
        .nest("/sales", sale_routes())
        .nest("/stock-updates", stock_routes())
        .route("/finance", get(handlers::get_overview))
        .route(
            "/cash-transactions",
            get(handlers::list_cash_transactions).post(handlers::create_cash_transaction),
        )
        .route("/reports/profit", get(handlers::get_profit_report))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Ingredient category routes
fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_categories).post(handlers::create_category))
        .route(
            "/:category_id",
            put(handlers::rename_category).delete(handlers::delete_category),
        )
}

/// Ingredient routes
fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_ingredients).post(handlers::create_ingredient))
        .route(
            "/:ingredient_id",
            get(handlers::get_ingredient)
                .put(handlers::update_ingredient)
                .delete(handlers::delete_ingredient),
        )
}

/// Product and recipe routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/categories", get(handlers::list_product_categories))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

/// Sale routes
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route("/:sale_id", get(handlers::get_sale).delete(handlers::delete_sale))
}

/// Stock receipt routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_stock_updates).post(handlers::create_stock_update),
        )
        .route("/:stock_update_id", delete(handlers::delete_stock_update))
}
