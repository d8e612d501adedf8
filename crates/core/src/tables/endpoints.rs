//! Saturation end-points derived from SWOF / SGOF
//!
//! When the deck does not give an end-point property such as SWU, each cell
//! takes the value of the table selected by its saturation region: SATNUM for
//! drainage keywords, IMBNUM for the I-prefixed imbibition keywords.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SatFuncTable, TableManager};
use crate::error::{FieldPropsError, Result};
use crate::grid::CartesianGrid;

/// Which end-point a keyword describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointKind {
    /// Connate water
    Swl,
    /// Maximum water
    Swu,
    /// Critical water
    Swcr,
    /// Connate gas
    Sgl,
    /// Maximum gas
    Sgu,
    /// Critical gas
    Sgcr,
    /// Critical oil in water
    Sowcr,
    /// Critical oil in gas
    Sogcr,
}

impl EndpointKind {
    pub const ALL: [EndpointKind; 8] = [
        EndpointKind::Swl,
        EndpointKind::Swu,
        EndpointKind::Swcr,
        EndpointKind::Sgl,
        EndpointKind::Sgu,
        EndpointKind::Sgcr,
        EndpointKind::Sowcr,
        EndpointKind::Sogcr,
    ];

    /// Drainage keyword name
    pub fn keyword(self) -> &'static str {
        match self {
            EndpointKind::Swl => "SWL",
            EndpointKind::Swu => "SWU",
            EndpointKind::Swcr => "SWCR",
            EndpointKind::Sgl => "SGL",
            EndpointKind::Sgu => "SGU",
            EndpointKind::Sgcr => "SGCR",
            EndpointKind::Sowcr => "SOWCR",
            EndpointKind::Sogcr => "SOGCR",
        }
    }

    fn uses_gas_tables(self) -> bool {
        matches!(
            self,
            EndpointKind::Sgl | EndpointKind::Sgu | EndpointKind::Sgcr | EndpointKind::Sogcr
        )
    }
}

/// An end-point keyword resolved to its kind and region array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointKeyword {
    pub kind: EndpointKind,
    /// I-prefixed variant, regions from IMBNUM
    pub imbibition: bool,
}

impl EndpointKeyword {
    /// Resolve a keyword name; `None` if it is not an end-point keyword
    pub fn parse(name: &str) -> Option<Self> {
        let find = |n: &str| EndpointKind::ALL.into_iter().find(|k| k.keyword() == n);
        if let Some(kind) = find(name) {
            return Some(Self {
                kind,
                imbibition: false,
            });
        }
        name.strip_prefix('I').and_then(find).map(|kind| Self {
            kind,
            imbibition: true,
        })
    }

    /// Keyword name, with the I prefix for imbibition
    pub fn name(&self) -> String {
        if self.imbibition {
            format!("I{}", self.kind.keyword())
        } else {
            self.kind.keyword().to_string()
        }
    }

    /// Region array that selects the table for each cell
    pub fn region_keyword(&self) -> &'static str {
        if self.imbibition {
            "IMBNUM"
        } else {
            "SATNUM"
        }
    }

    /// Every drainage and imbibition end-point keyword
    pub fn all_names() -> Vec<String> {
        EndpointKind::ALL
            .into_iter()
            .flat_map(|kind| {
                [false, true].map(|imbibition| EndpointKeyword { kind, imbibition }.name())
            })
            .collect()
    }
}

impl TableManager {
    /// Per-table value of an end-point, `None` if the needed tables are absent
    pub fn endpoint_values(&self, kind: EndpointKind) -> Option<Vec<f64>> {
        let tables = if kind.uses_gas_tables() {
            self.sgof()
        } else {
            self.swof()
        };
        if tables.is_empty() {
            return None;
        }

        let per_table = |f: fn(&SatFuncTable) -> f64| tables.iter().map(f).collect::<Vec<_>>();
        let values = match kind {
            EndpointKind::Swl | EndpointKind::Sgl => per_table(SatFuncTable::min_sat),
            EndpointKind::Swu | EndpointKind::Sgu => per_table(SatFuncTable::max_sat),
            EndpointKind::Swcr | EndpointKind::Sgcr => per_table(SatFuncTable::critical_sat),
            EndpointKind::Sowcr => tables
                .iter()
                .map(|t| t.oil_immobile_sat().map_or(0.0, |sw| 1.0 - sw))
                .collect(),
            EndpointKind::Sogcr => tables
                .iter()
                .enumerate()
                .map(|(n, t)| {
                    let swl = self.swof().get(n).map_or(0.0, SatFuncTable::min_sat);
                    t.oil_immobile_sat().map_or(0.0, |sg| 1.0 - sg - swl)
                })
                .collect(),
        };
        Some(values)
    }
}

/// Fill an end-point array from the tables, one value per cartesian cell
///
/// `regions` holds the 1-based table number of every cell. Inactive cells
/// whose region has no table are left as NaN.
///
/// Returns `None` when the deck has no tables for this end-point.
///
/// # Errors
/// Returns `InvalidArgument` if an active cell names a missing table, or if
/// `regions` does not cover the grid
pub fn derive_endpoint(
    keyword: EndpointKeyword,
    tables: &TableManager,
    regions: &[i32],
    grid: &CartesianGrid,
) -> Result<Option<Vec<f64>>> {
    let Some(per_table) = tables.endpoint_values(keyword.kind) else {
        debug!(keyword = %keyword.name(), "no saturation tables, end-point left at default");
        return Ok(None);
    };
    if regions.len() != grid.cartesian_size() {
        return Err(FieldPropsError::invalid_argument(format!(
            "{} has {} entries, grid has {} cells",
            keyword.region_keyword(),
            regions.len(),
            grid.cartesian_size()
        )));
    }

    let mut values = vec![f64::NAN; regions.len()];
    for (g, (&region, value)) in regions.iter().zip(values.iter_mut()).enumerate() {
        let table = usize::try_from(region)
            .ok()
            .and_then(|r| r.checked_sub(1))
            .and_then(|t| per_table.get(t));
        match table {
            Some(&v) => *value = v,
            None if grid.is_active(g) => {
                return Err(FieldPropsError::invalid_argument(format!(
                    "{}: cell {g} has {} {region} but only {} tables exist",
                    keyword.name(),
                    keyword.region_keyword(),
                    per_table.len()
                )));
            }
            None => {}
        }
    }

    debug!(keyword = %keyword.name(), tables = per_table.len(), "derived end-point from tables");
    Ok(Some(values))
}
