//! Element types a grid property can hold

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

use crate::deck::{DeckItem, Measure, UnitSystem};
use crate::error::{FieldPropsError, Result};

/// Cell value type of a [`GridProperty`](super::GridProperty)
///
/// Implemented for `i32` (region numbers, ACTNUM) and `f64` (porosity,
/// permeability, end-points).
pub trait PropertyValue:
    Copy
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + Serialize
    + DeserializeOwned
    + 'static
{
    /// Human readable element type, used in diagnostics
    const TYPE_NAME: &'static str;

    /// Convert an explicit deck item to a stored value in SI units
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the item is defaulted or of the wrong type
    fn from_item(item: &DeckItem, units: UnitSystem, measure: Measure) -> Result<Self>;

    /// `self + rhs`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the result does not fit the type
    fn try_add(self, rhs: Self) -> Result<Self>;

    /// `self * rhs`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the result does not fit the type
    fn try_mul(self, rhs: Self) -> Result<Self>;

    /// True for the floating point "not yet set" sentinel
    #[inline]
    fn is_nan(self) -> bool {
        false
    }
}

impl PropertyValue for i32 {
    const TYPE_NAME: &'static str = "int";

    fn from_item(item: &DeckItem, _units: UnitSystem, _measure: Measure) -> Result<Self> {
        item.as_int().ok_or_else(|| {
            FieldPropsError::invalid_argument(format!("expected an integer item, got {item:?}"))
        })
    }

    fn try_add(self, rhs: Self) -> Result<Self> {
        self.checked_add(rhs).ok_or_else(|| {
            FieldPropsError::invalid_argument(format!("{self} + {rhs} overflows an int property"))
        })
    }

    fn try_mul(self, rhs: Self) -> Result<Self> {
        self.checked_mul(rhs).ok_or_else(|| {
            FieldPropsError::invalid_argument(format!("{self} * {rhs} overflows an int property"))
        })
    }
}

impl PropertyValue for f64 {
    const TYPE_NAME: &'static str = "double";

    fn from_item(item: &DeckItem, units: UnitSystem, measure: Measure) -> Result<Self> {
        item.as_double()
            .map(|raw| units.to_si(measure, raw))
            .ok_or_else(|| {
                FieldPropsError::invalid_argument(format!("expected a numeric item, got {item:?}"))
            })
    }

    #[inline]
    fn try_add(self, rhs: Self) -> Result<Self> {
        Ok(self + rhs)
    }

    #[inline]
    fn try_mul(self, rhs: Self) -> Result<Self> {
        Ok(self * rhs)
    }

    #[inline]
    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_rejects_double() {
        assert_eq!(
            i32::from_item(&DeckItem::Int(4), UnitSystem::Metric, Measure::Identity).unwrap(),
            4
        );
        assert!(i32::from_item(&DeckItem::Double(4.0), UnitSystem::Metric, Measure::Identity).is_err());
        assert!(i32::from_item(&DeckItem::Defaulted, UnitSystem::Metric, Measure::Identity).is_err());
    }

    #[test]
    fn test_int_arithmetic_overflow_is_an_error() {
        assert_eq!(40_i32.try_add(2).unwrap(), 42);
        assert_eq!((-3_i32).try_mul(7).unwrap(), -21);
        assert!(matches!(i32::MAX.try_add(1), Err(FieldPropsError::InvalidArgument(_))));
        assert!(matches!(i32::MIN.try_mul(-1), Err(FieldPropsError::InvalidArgument(_))));

        // Floats saturate to infinity instead
        assert_eq!(f64::MAX.try_mul(2.0).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_double_converts_to_si() {
        let v = f64::from_item(&DeckItem::Int(10), UnitSystem::Field, Measure::Length).unwrap();
        assert!((v - 3.048).abs() < 1e-12);
    }
}
