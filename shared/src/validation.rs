//! Validation utilities shared by the backend and the WASM client

use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult};
use crate::units::Unit;

/// Value must be strictly greater than zero
pub fn require_positive(field: &str, value: Decimal) -> DomainResult<()> {
    if value <= Decimal::ZERO {
        return Err(DomainError::validation(field, "Must be greater than zero"));
    }
    Ok(())
}

/// Value must be zero or more
pub fn require_non_negative(field: &str, value: Decimal) -> DomainResult<()> {
    if value < Decimal::ZERO {
        return Err(DomainError::validation(field, "Cannot be negative"));
    }
    Ok(())
}

/// String must contain something other than whitespace
pub fn require_non_blank(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "Field cannot be empty"));
    }
    Ok(())
}

/// `unit` must be measured in the same family as `reference`
pub fn require_same_family(field: &str, unit: Unit, reference: Unit) -> DomainResult<()> {
    if !unit.same_family(reference) {
        return Err(DomainError::validation(
            field,
            format!("Unit '{}' is not compatible with '{}'", unit, reference),
        ));
    }
    Ok(())
}

/// Parse a unit string, naming the field on failure
pub fn parse_unit(field: &str, value: &str) -> DomainResult<Unit> {
    value
        .parse::<Unit>()
        .map_err(|_| DomainError::validation(field, format!("Unknown unit '{}'", value)))
}

/// Units of an ingredient as typed: the stock unit, a threshold unit and an
/// optional cost unit that falls back to the stock unit. Threshold and cost
/// must be measured in the stock unit's family.
pub fn ingredient_units(
    stock_unit: &str,
    threshold_unit: &str,
    cost_unit: Option<&str>,
) -> DomainResult<(Unit, Unit, Unit)> {
    let stock = parse_unit("stock_unit", stock_unit)?;
    let threshold = parse_unit("threshold_unit", threshold_unit)?;
    let cost = match cost_unit {
        Some(unit) => parse_unit("cost_unit", unit)?,
        None => stock,
    };
    require_same_family("threshold_unit", threshold, stock)?;
    require_same_family("cost_unit", cost, stock)?;
    Ok((stock, threshold, cost))
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_positive() {
        assert!(require_positive("quantity", dec("0.001")).is_ok());
        assert!(require_positive("quantity", Decimal::ZERO).is_err());
        assert!(require_positive("quantity", dec("-1")).is_err());
    }

    #[test]
    fn test_non_negative() {
        assert!(require_non_negative("current_stock", Decimal::ZERO).is_ok());
        let err = require_non_negative("current_stock", dec("-0.5")).unwrap_err();
        assert_eq!(err.field(), Some("current_stock"));
    }

    #[test]
    fn test_non_blank() {
        assert!(require_non_blank("name", "Oat Milk").is_ok());
        assert!(require_non_blank("name", "   ").is_err());
    }

    #[test]
    fn test_same_family() {
        assert!(require_same_family("threshold_unit", Unit::Kg, Unit::G).is_ok());
        assert!(require_same_family("threshold_unit", Unit::L, Unit::G).is_err());
    }

    #[test]
    fn test_parse_unit_names_field() {
        assert_eq!(parse_unit("unit", "kg").unwrap(), Unit::Kg);
        let err = parse_unit("stock_unit", "cups").unwrap_err();
        assert_eq!(err.field(), Some("stock_unit"));
    }

    #[test]
    fn test_ingredient_units_default_cost_unit() {
        let (stock, threshold, cost) = ingredient_units("kg", "g", None).unwrap();
        assert_eq!((stock, threshold, cost), (Unit::Kg, Unit::G, Unit::Kg));
    }

    #[test]
    fn test_ingredient_units_reject_mixed_families() {
        let err = ingredient_units("l", "g", None).unwrap_err();
        assert_eq!(err.field(), Some("threshold_unit"));
        let err = ingredient_units("ml", "ml", Some("kg")).unwrap_err();
        assert_eq!(err.field(), Some("cost_unit"));
    }

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("barista@cafe.com").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("short").is_err());
    }
}
