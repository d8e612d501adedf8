//! SWOF / SGOF saturation function tables
//!
//! Each record of SWOF or SGOF is one table of four-column rows:
//! saturation, phase relative permeability, oil relative permeability and
//! capillary pressure. Capillary pressure is stored in SI.

use serde::{Deserialize, Serialize};

use crate::deck::{Deck, DeckKeyword, DeckRecord, Measure, UnitSystem};
use crate::error::{FieldPropsError, Result};

const COLUMNS: usize = 4;

/// One row of a two-phase saturation table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SatRow {
    /// Water saturation (SWOF) or gas saturation (SGOF)
    pub sat: f64,
    /// krw or krg
    pub kr_phase: f64,
    /// krow or krog
    pub kr_oil: f64,
    /// Capillary pressure (Pa)
    pub pc: f64,
}

/// Saturation table with strictly increasing saturation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatFuncTable {
    rows: Vec<SatRow>,
}

impl SatFuncTable {
    /// Create a table from its rows
    ///
    /// # Errors
    /// Returns `InvalidArgument` for fewer than two rows or a saturation
    /// column that is not strictly increasing
    pub fn new(rows: Vec<SatRow>) -> Result<Self> {
        if rows.len() < 2 {
            return Err(FieldPropsError::invalid_argument(format!(
                "saturation table needs at least two rows, got {}",
                rows.len()
            )));
        }
        if let Some(w) = rows.windows(2).find(|w| w[1].sat <= w[0].sat) {
            return Err(FieldPropsError::invalid_argument(format!(
                "saturation column must increase strictly, {} follows {}",
                w[1].sat, w[0].sat
            )));
        }
        Ok(Self { rows })
    }

    /// Rows in ascending saturation
    pub fn rows(&self) -> &[SatRow] {
        &self.rows
    }

    /// Smallest tabulated saturation
    pub fn min_sat(&self) -> f64 {
        self.rows[0].sat
    }

    /// Largest tabulated saturation
    pub fn max_sat(&self) -> f64 {
        self.rows[self.rows.len() - 1].sat
    }

    /// Largest saturation at which the phase is still immobile
    pub fn critical_sat(&self) -> f64 {
        match self.rows.iter().position(|r| r.kr_phase > 0.0) {
            Some(0) => self.rows[0].sat,
            Some(first_mobile) => self.rows[first_mobile - 1].sat,
            None => self.max_sat(),
        }
    }

    /// Smallest saturation at which oil becomes immobile, if it ever does
    pub fn oil_immobile_sat(&self) -> Option<f64> {
        self.rows.iter().find(|r| r.kr_oil <= 0.0).map(|r| r.sat)
    }

    fn from_record(record: &DeckRecord, units: UnitSystem) -> Result<Self> {
        if record.is_empty() || record.len() % COLUMNS != 0 {
            return Err(FieldPropsError::invalid_argument(format!(
                "table record has {} items, expected a multiple of {COLUMNS}",
                record.len()
            )));
        }

        let values = record
            .items()
            .iter()
            .map(|item| {
                item.as_double().ok_or_else(|| {
                    FieldPropsError::invalid_argument(format!(
                        "table items must be explicit numbers, got {item:?}"
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        let rows = values
            .chunks_exact(COLUMNS)
            .map(|c| SatRow {
                sat: c[0],
                kr_phase: c[1],
                kr_oil: c[2],
                pc: units.to_si(Measure::Pressure, c[3]),
            })
            .collect();
        Self::new(rows)
    }
}

/// Saturation tables of one case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableManager {
    swof: Vec<SatFuncTable>,
    sgof: Vec<SatFuncTable>,
}

impl TableManager {
    /// Create from already built tables
    pub fn new(swof: Vec<SatFuncTable>, sgof: Vec<SatFuncTable>) -> Self {
        Self { swof, sgof }
    }

    /// Read SWOF and SGOF from the deck; the last occurrence of each wins
    ///
    /// # Errors
    /// Returns `Input` for malformed table records
    pub fn from_deck(deck: &Deck) -> Result<Self> {
        let units = deck.unit_system();
        let read = |name: &str| -> Result<Vec<SatFuncTable>> {
            deck.last_keyword(name)
                .map_or_else(|| Ok(Vec::new()), |kw| Self::read_tables(kw, units))
        };

        Ok(Self {
            swof: read("SWOF")?,
            sgof: read("SGOF")?,
        })
    }

    /// Water-oil tables, one per saturation region
    pub fn swof(&self) -> &[SatFuncTable] {
        &self.swof
    }

    /// Gas-oil tables, one per saturation region
    pub fn sgof(&self) -> &[SatFuncTable] {
        &self.sgof
    }

    fn read_tables(keyword: &DeckKeyword, units: UnitSystem) -> Result<Vec<SatFuncTable>> {
        let location = keyword.location();
        keyword
            .records()
            .iter()
            .enumerate()
            .map(|(n, record)| {
                SatFuncTable::from_record(record, units).map_err(|e| {
                    FieldPropsError::input(format!("table {}: {e}", n + 1), &location)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::DeckItem;

    fn record(values: &[f64]) -> DeckRecord {
        values.iter().copied().map(DeckItem::Double).collect()
    }

    #[test]
    fn test_swof_endpoints() {
        let table = SatFuncTable::from_record(
            &record(&[
                0.1, 0.0, 1.0, 2.0, //
                0.15, 0.0, 0.9, 1.0, //
                0.2, 0.01, 0.5, 0.5, //
                0.93, 0.91, 0.0, 0.0,
            ]),
            UnitSystem::Metric,
        )
        .unwrap();

        assert_eq!(table.min_sat(), 0.1);
        assert_eq!(table.max_sat(), 0.93);
        assert_eq!(table.critical_sat(), 0.15);
        assert_eq!(table.oil_immobile_sat(), Some(0.93));
        assert_eq!(table.rows()[0].pc, 2.0e5);
    }

    #[test]
    fn test_table_validation() {
        assert!(SatFuncTable::from_record(&record(&[0.1, 0.0, 1.0]), UnitSystem::Metric).is_err());
        assert!(SatFuncTable::from_record(&record(&[0.1, 0.0, 1.0, 0.0]), UnitSystem::Metric).is_err());
        assert!(SatFuncTable::from_record(
            &record(&[0.5, 0.0, 1.0, 0.0, 0.2, 1.0, 0.0, 0.0]),
            UnitSystem::Metric
        )
        .is_err());
    }

    #[test]
    fn test_from_deck_reports_location() {
        let deck = Deck::new(vec![DeckKeyword::new(
            "SGOF",
            vec![record(&[0.0, 0.0, 1.0, 0.0, 0.8, 1.0, 0.0, 0.0]), record(&[0.0, 0.0])],
        )
        .with_location("PROPS.INC", 30)]);

        match TableManager::from_deck(&deck) {
            Err(FieldPropsError::Input { message, location }) => {
                assert!(message.starts_with("table 2"));
                assert_eq!(location.lineno, 30);
            }
            other => panic!("expected input error, got {other:?}"),
        }
    }
}
