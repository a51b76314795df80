//! Domain errors raised by the costing, stock and finance rules

use rust_decimal::Decimal;
use thiserror::Error;

use crate::units::Unit;

/// Errors produced by the pure domain rules.
///
/// These carry enough context for the HTTP layer to name the offending
/// field or ingredient without re-deriving anything.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Unknown unit '{0}'; expected one of g, kg, ml, l")]
    UnknownUnit(String),

    #[error("Cannot convert between {from} and {to}: different unit families")]
    UnitFamilyMismatch { from: Unit, to: Unit },

    #[error(
        "Insufficient stock for {ingredient}: requires {required} {unit}, \
         {available} {unit} available (short by {shortfall} {unit})"
    )]
    InsufficientStock {
        ingredient: String,
        required: Decimal,
        available: Decimal,
        shortfall: Decimal,
        unit: Unit,
    },

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Unknown report period '{0}'; expected daily, weekly or monthly")]
    UnknownPeriod(String),

    #[error("{field}: {message}")]
    Validation { field: String, message: String },
}

impl DomainError {
    /// Build a validation error for a named field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::UnknownUnit(_) => "UNKNOWN_UNIT",
            DomainError::UnitFamilyMismatch { .. } => "UNIT_FAMILY_MISMATCH",
            DomainError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            DomainError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            DomainError::UnknownPeriod(_) => "UNKNOWN_PERIOD",
            DomainError::Validation { .. } => "VALIDATION_ERROR",
        }
    }

    /// True for errors caused by malformed input rather than a business rule
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownUnit(_)
                | DomainError::UnitFamilyMismatch { .. }
                | DomainError::UnknownPeriod(_)
                | DomainError::Validation { .. }
        )
    }

    /// Field the error refers to, when there is one
    pub fn field(&self) -> Option<&str> {
        match self {
            DomainError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
