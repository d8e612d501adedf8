//! Unit systems for deck input
//!
//! Values in the deck are written in the case's unit system and stored in SI.
//! Only the measures that grid properties use are covered here.

use serde::{Deserialize, Serialize};

use crate::error::{FieldPropsError, Result};

/// Permeability of one millidarcy in m²
const MILLIDARCY: f64 = 9.869_233e-16;
const FEET: f64 = 0.3048;
const CENTIMETER: f64 = 0.01;
const BARSA: f64 = 1.0e5;
const PSIA: f64 = 6_894.757_293_168;
const ATM: f64 = 101_325.0;

/// Physical quantity a property value measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measure {
    /// Dimensionless; stored as written
    Identity,
    Length,
    Permeability,
    Pressure,
}

impl Measure {
    /// Map a keyword dimension string ("1", "Length", ...) to a measure
    ///
    /// # Errors
    /// Returns `InvalidArgument` for dimension strings with no known measure
    pub fn from_dimension(dimension: &str) -> Result<Self> {
        match dimension {
            "1" => Ok(Measure::Identity),
            "Length" => Ok(Measure::Length),
            "Permeability" => Ok(Measure::Permeability),
            "Pressure" => Ok(Measure::Pressure),
            other => Err(FieldPropsError::invalid_argument(format!(
                "unknown dimension '{other}'"
            ))),
        }
    }
}

/// Deck unit convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    #[default]
    Metric,
    Field,
    Lab,
}

impl UnitSystem {
    /// Unit system selected by a RUNSPEC keyword, if `name` is one
    pub fn from_keyword(name: &str) -> Option<Self> {
        match name {
            "METRIC" => Some(UnitSystem::Metric),
            "FIELD" => Some(UnitSystem::Field),
            "LAB" => Some(UnitSystem::Lab),
            _ => None,
        }
    }

    /// SI value of one deck unit of `measure`
    pub fn si_factor(self, measure: Measure) -> f64 {
        match (self, measure) {
            (_, Measure::Identity) | (UnitSystem::Metric, Measure::Length) => 1.0,
            (_, Measure::Permeability) => MILLIDARCY,
            (UnitSystem::Field, Measure::Length) => FEET,
            (UnitSystem::Lab, Measure::Length) => CENTIMETER,
            (UnitSystem::Metric, Measure::Pressure) => BARSA,
            (UnitSystem::Field, Measure::Pressure) => PSIA,
            (UnitSystem::Lab, Measure::Pressure) => ATM,
        }
    }

    /// Convert a deck value to SI
    #[inline]
    pub fn to_si(self, measure: Measure, value: f64) -> f64 {
        value * self.si_factor(measure)
    }

    /// Convert an SI value back to deck units
    #[inline]
    pub fn from_si(self, measure: Measure, value: f64) -> f64 {
        value / self.si_factor(measure)
    }
}
