//! Input validation tests
//!
//! Tests for:
//! - Unit parsing and ingredient unit families
//! - Field-level validation errors
//! - Account email, password and role checks

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::error::DomainError;
use shared::types::UserRole;
use shared::units::Unit;
use shared::validation::{
    ingredient_units, parse_unit, require_non_blank, require_positive, validate_email,
    validate_password,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate valid email addresses
fn email_strategy() -> impl Strategy<Value = String> {
    "[a-z]{5,10}@[a-z]{3,8}\\.(com|org|net|cafe)"
}

/// Generate valid passwords (8+ chars)
fn password_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!@#$%]{8,20}"
}

/// Unit spellings accepted from clients
fn unit_spelling_strategy() -> impl Strategy<Value = (String, Unit)> {
    prop_oneof![
        Just(("g".to_string(), Unit::G)),
        Just(("KG".to_string(), Unit::Kg)),
        Just((" ml ".to_string(), Unit::Ml)),
        Just(("L".to_string(), Unit::L)),
    ]
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_unknown_unit_names_field() {
        let err = parse_unit("stock_unit", "cups").unwrap_err();
        assert_eq!(err.field(), Some("stock_unit"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_cost_unit_defaults_to_stock_unit() {
        let (stock, threshold, cost) = ingredient_units("kg", "g", None).unwrap();
        assert_eq!(stock, Unit::Kg);
        assert_eq!(threshold, Unit::G);
        assert_eq!(cost, Unit::Kg);
    }

    #[test]
    fn test_threshold_must_share_family() {
        let err = ingredient_units("l", "g", None).unwrap_err();
        assert_eq!(err.field(), Some("threshold_unit"));

        let err = ingredient_units("g", "kg", Some("ml")).unwrap_err();
        assert_eq!(err.field(), Some("cost_unit"));
    }

    #[test]
    fn test_blank_and_non_positive_values() {
        assert!(require_non_blank("name", "   ").is_err());
        assert!(require_non_blank("name", "Oat Milk").is_ok());
        assert!(matches!(
            require_positive("quantity", Decimal::ZERO),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn test_roles() {
        assert_eq!(UserRole::default(), UserRole::Staff);
        assert_eq!(UserRole::from_str("manager"), Some(UserRole::Manager));
        assert_eq!(UserRole::from_str("owner"), None);
        assert_eq!(UserRole::Admin.as_str(), "admin");
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_email("a@b").is_err());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_valid_emails_accepted(email in email_strategy()) {
        prop_assert!(validate_email(&email).is_ok());
    }

    #[test]
    fn prop_valid_passwords_accepted(password in password_strategy()) {
        prop_assert!(validate_password(&password).is_ok());
    }

    #[test]
    fn prop_unit_spellings_parse((spelling, unit) in unit_spelling_strategy()) {
        prop_assert_eq!(parse_unit("unit", &spelling).unwrap(), unit);
    }
}
