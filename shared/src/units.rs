//! Measurement units and conversion to the canonical base unit
//!
//! Every quantity in the system belongs to one of two families: mass
//! (grams, kilograms) or volume (milliliters, liters). Conversions always go
//! through the family's base unit (g or ml).

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Factor between a "large" unit and its base unit
const LARGE_UNIT_FACTOR: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Measurement family a unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitFamily {
    Mass,
    Volume,
}

impl UnitFamily {
    /// Canonical base unit of the family
    pub fn base_unit(&self) -> Unit {
        match self {
            UnitFamily::Mass => Unit::G,
            UnitFamily::Volume => Unit::Ml,
        }
    }
}

/// Supported stock, threshold, cost and recipe units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    G,
    Kg,
    Ml,
    L,
}

impl Unit {
    pub const ALL: [Unit; 4] = [Unit::G, Unit::Kg, Unit::Ml, Unit::L];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::G => "g",
            Unit::Kg => "kg",
            Unit::Ml => "ml",
            Unit::L => "l",
        }
    }

    pub fn family(&self) -> UnitFamily {
        match self {
            Unit::G | Unit::Kg => UnitFamily::Mass,
            Unit::Ml | Unit::L => UnitFamily::Volume,
        }
    }

    /// Whether this is the 1000x member of its family (kg, l)
    pub fn is_large(&self) -> bool {
        matches!(self, Unit::Kg | Unit::L)
    }

    pub fn base(&self) -> Unit {
        self.family().base_unit()
    }

    pub fn same_family(&self, other: Unit) -> bool {
        self.family() == other.family()
    }

    /// Fail with `UnitFamilyMismatch` unless both units share a family
    pub fn ensure_same_family(&self, other: Unit) -> DomainResult<()> {
        if self.same_family(other) {
            Ok(())
        } else {
            Err(DomainError::UnitFamilyMismatch {
                from: *self,
                to: other,
            })
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "g" => Ok(Unit::G),
            "kg" => Ok(Unit::Kg),
            "ml" => Ok(Unit::Ml),
            "l" => Ok(Unit::L),
            _ => Err(DomainError::UnknownUnit(s.to_string())),
        }
    }
}

/// Convert a quantity expressed in `unit` into the family's base unit
pub fn to_base(value: Decimal, unit: Unit) -> Decimal {
    if unit.is_large() {
        value * LARGE_UNIT_FACTOR
    } else {
        value
    }
}

/// Convert a base-unit quantity back into `unit`
pub fn from_base(value: Decimal, unit: Unit) -> Decimal {
    if unit.is_large() {
        value / LARGE_UNIT_FACTOR
    } else {
        value
    }
}

/// Convert a quantity between two units of the same family
pub fn convert(value: Decimal, from: Unit, to: Unit) -> DomainResult<Decimal> {
    from.ensure_same_family(to)?;
    if from == to {
        return Ok(value);
    }
    Ok(from_base(to_base(value, from), to))
}

/// Re-express a price quoted per `from` unit as a price per `to` unit.
///
/// Prices scale inversely to quantities: 8.00 per kg is 0.008 per g.
pub fn convert_price(price: Decimal, from: Unit, to: Unit) -> DomainResult<Decimal> {
    from.ensure_same_family(to)?;
    if from == to {
        return Ok(price);
    }
    Ok(to_base(price_per_base(price, from), to))
}

/// Price per base unit for a price quoted per `unit`
pub fn price_per_base(price: Decimal, unit: Unit) -> Decimal {
    from_base(price, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_large_units_scale_by_thousand() {
        assert_eq!(to_base(dec("1.5"), Unit::Kg), dec("1500"));
        assert_eq!(to_base(dec("2"), Unit::L), dec("2000"));
        assert_eq!(from_base(dec("250"), Unit::Kg), dec("0.25"));
        assert_eq!(from_base(dec("750"), Unit::L), dec("0.75"));
    }

    #[test]
    fn test_base_units_are_identity() {
        assert_eq!(to_base(dec("12.5"), Unit::G), dec("12.5"));
        assert_eq!(from_base(dec("12.5"), Unit::Ml), dec("12.5"));
    }

    #[test]
    fn test_convert_within_family() {
        assert_eq!(convert(dec("500"), Unit::G, Unit::Kg).unwrap(), dec("0.5"));
        assert_eq!(convert(dec("0.2"), Unit::L, Unit::Ml).unwrap(), dec("200"));
        assert_eq!(convert(dec("3"), Unit::Kg, Unit::Kg).unwrap(), dec("3"));
    }

    #[test]
    fn test_convert_across_families_fails() {
        let err = convert(dec("1"), Unit::Kg, Unit::L).unwrap_err();
        assert_eq!(
            err,
            DomainError::UnitFamilyMismatch {
                from: Unit::Kg,
                to: Unit::L
            }
        );
    }

    #[test]
    fn test_convert_price_inverts_scale() {
        assert_eq!(convert_price(dec("8"), Unit::Kg, Unit::G).unwrap(), dec("0.008"));
        assert_eq!(convert_price(dec("0.05"), Unit::G, Unit::Kg).unwrap(), dec("50"));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!("kg".parse::<Unit>().unwrap(), Unit::Kg);
        assert_eq!(" ML ".parse::<Unit>().unwrap(), Unit::Ml);
        assert!(matches!("liters".parse::<Unit>(), Err(DomainError::UnknownUnit(_))));
    }

    #[test]
    fn test_unit_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Unit::Kg).unwrap(), "\"kg\"");
        let unit: Unit = serde_json::from_str("\"ml\"").unwrap();
        assert_eq!(unit, Unit::Ml);
    }
}
