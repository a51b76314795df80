//! WebAssembly module for Coffee Shop Management
//!
//! Provides client-side computation for:
//! - Unit conversion between g/kg and ml/l
//! - Recipe line cost and profit previews
//! - Low-stock checks
//! - Offline form validation
//!
//! Decimal values cross the boundary as strings so no precision is lost to
//! JavaScript numbers.

use std::str::FromStr;

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::costing;
use shared::units::{self, Unit};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&"coffee-shop-wasm ready".into());
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|_| format!("{} must be a number", field))
}

fn parse_unit(field: &str, value: &str) -> Result<Unit, String> {
    shared::validation::parse_unit(field, value).map_err(|e| e.to_string())
}

fn to_js(message: String) -> JsValue {
    JsValue::from_str(&message)
}

fn convert_quantity_inner(value: &str, from: &str, to: &str) -> Result<String, String> {
    let value = parse_decimal("value", value)?;
    let from = parse_unit("from", from)?;
    let to = parse_unit("to", to)?;
    let converted = units::convert(value, from, to).map_err(|e| e.to_string())?;
    Ok(round_quantity(converted).normalize().to_string())
}

fn line_cost_inner(
    cost_per_unit: &str,
    cost_unit: &str,
    quantity: &str,
    unit: &str,
) -> Result<String, String> {
    let cost_per_unit = parse_decimal("cost_per_unit", cost_per_unit)?;
    let cost_unit = parse_unit("cost_unit", cost_unit)?;
    let quantity = parse_decimal("quantity", quantity)?;
    let unit = parse_unit("unit", unit)?;
    require_same_family("unit", unit, cost_unit).map_err(|e| e.to_string())?;

    let cost = costing::line_cost(cost_per_unit, cost_unit, quantity, unit);
    Ok(round_money(cost).to_string())
}

fn price_inner(price: &str, from: &str, to: &str) -> Result<String, String> {
    let price = parse_decimal("price", price)?;
    let from = parse_unit("from", from)?;
    let to = parse_unit("to", to)?;
    let converted = units::convert_price(price, from, to).map_err(|e| e.to_string())?;
    Ok(round_quantity(converted).normalize().to_string())
}

fn profit_inner(selling_price: &str, cost: &str) -> Result<String, String> {
    let selling_price = parse_decimal("selling_price", selling_price)?;
    let cost = parse_decimal("cost", cost)?;
    let summary = costing::profit(selling_price, cost);
    serde_json::to_string(&summary).map_err(|e| e.to_string())
}

fn low_stock_inner(
    stock: &str,
    stock_unit: &str,
    threshold: &str,
    threshold_unit: &str,
) -> Result<bool, String> {
    let stock = parse_decimal("current_stock", stock)?;
    let stock_unit = parse_unit("stock_unit", stock_unit)?;
    let threshold = parse_decimal("min_threshold", threshold)?;
    let threshold_unit = parse_unit("threshold_unit", threshold_unit)?;
    require_same_family("threshold_unit", threshold_unit, stock_unit).map_err(|e| e.to_string())?;

    Ok(is_low_stock_level(stock, stock_unit, threshold, threshold_unit))
}

/// Convert a quantity between units of the same family
#[wasm_bindgen]
pub fn convert_quantity(value: &str, from: &str, to: &str) -> Result<String, JsValue> {
    convert_quantity_inner(value, from, to).map_err(to_js)
}

/// Re-express a price quoted per `from` as a price per `to`
#[wasm_bindgen]
pub fn convert_price(price: &str, from: &str, to: &str) -> Result<String, JsValue> {
    price_inner(price, from, to).map_err(to_js)
}

/// Units a quantity in `unit` can be entered in
#[wasm_bindgen]
pub fn compatible_units(unit: &str) -> Result<js_sys::Array, JsValue> {
    let unit = parse_unit("unit", unit).map_err(to_js)?;
    let family = unit.family();
    Ok(Unit::ALL
        .into_iter()
        .filter(|candidate| candidate.family() == family)
        .map(|candidate| JsValue::from_str(candidate.as_str()))
        .collect())
}

/// Cost of one recipe line, rounded to cents
#[wasm_bindgen]
pub fn preview_line_cost(
    cost_per_unit: &str,
    cost_unit: &str,
    quantity: &str,
    unit: &str,
) -> Result<String, JsValue> {
    line_cost_inner(cost_per_unit, cost_unit, quantity, unit).map_err(to_js)
}

/// Profit amount and percentage as JSON
#[wasm_bindgen]
pub fn preview_profit(selling_price: &str, cost: &str) -> Result<String, JsValue> {
    profit_inner(selling_price, cost).map_err(to_js)
}

/// Whether stock is at or below the threshold
#[wasm_bindgen]
pub fn is_low_stock(
    stock: &str,
    stock_unit: &str,
    threshold: &str,
    threshold_unit: &str,
) -> Result<bool, JsValue> {
    low_stock_inner(stock, stock_unit, threshold, threshold_unit).map_err(to_js)
}

/// Error message for an email, or `None` when it looks valid
#[wasm_bindgen]
pub fn check_email(email: &str) -> Option<String> {
    validate_email(email).err().map(str::to_string)
}

/// Error message for a password, or `None` when it is acceptable
#[wasm_bindgen]
pub fn check_password(password: &str) -> Option<String> {
    validate_password(password).err().map(str::to_string)
}
