//! Logically cartesian corner-point grid with an active-cell map
//!
//! Only the topology matters to grid properties: the NX×NY×NZ cell count and
//! which cells are active. Cells are numbered row-major with i fastest:
//! `g = i + nx * (j + ny * k)`.

use serde::{Deserialize, Serialize};

use crate::deck::{Deck, DeckItem};
use crate::error::{FieldPropsError, Result};

/// Grid topology: dimensions plus global ⇄ active index maps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartesianGrid {
    nx: usize,
    ny: usize,
    nz: usize,
    /// Active index → global index, ascending
    active_to_global: Vec<usize>,
    /// Global index → active index for active cells
    global_to_active: Vec<Option<usize>>,
}

impl CartesianGrid {
    /// Create a grid where every cell is active
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        let size = nx * ny * nz;
        Self {
            nx,
            ny,
            nz,
            active_to_global: (0..size).collect(),
            global_to_active: (0..size).map(Some).collect(),
        }
    }

    /// Create a grid from an ACTNUM array; non-zero entries are active
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `actnum` does not hold one entry per cell
    pub fn with_actnum(nx: usize, ny: usize, nz: usize, actnum: &[i32]) -> Result<Self> {
        let size = nx * ny * nz;
        if actnum.len() != size {
            return Err(FieldPropsError::invalid_argument(format!(
                "ACTNUM has {} entries, grid {nx}x{ny}x{nz} has {size} cells",
                actnum.len()
            )));
        }

        let mut active_to_global = Vec::with_capacity(size);
        let mut global_to_active = vec![None; size];
        for (g, &flag) in actnum.iter().enumerate() {
            if flag != 0 {
                global_to_active[g] = Some(active_to_global.len());
                active_to_global.push(g);
            }
        }

        Ok(Self {
            nx,
            ny,
            nz,
            active_to_global,
            global_to_active,
        })
    }

    /// Build the grid from the deck's DIMENS and (optional) ACTNUM keywords
    ///
    /// Defaulted ACTNUM items count as active.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if DIMENS is missing, and `Input` if DIMENS
    /// or ACTNUM are malformed
    pub fn from_deck(deck: &Deck) -> Result<Self> {
        let dimens = deck
            .last_keyword("DIMENS")
            .ok_or_else(|| FieldPropsError::invalid_argument("deck has no DIMENS keyword"))?;
        let location = dimens.location();

        let record = dimens
            .record(0)
            .ok_or_else(|| FieldPropsError::input("DIMENS has no record", &location))?;
        let mut dims = [0usize; 3];
        for (axis, dim) in dims.iter_mut().enumerate() {
            *dim = record
                .item(axis)
                .and_then(DeckItem::as_int)
                .filter(|&n| n > 0)
                .map(|n| n as usize)
                .ok_or_else(|| {
                    FieldPropsError::input(
                        format!("DIMENS item {} must be a positive integer", axis + 1),
                        &location,
                    )
                })?;
        }
        let [nx, ny, nz] = dims;

        match deck.last_keyword("ACTNUM") {
            None => Ok(Self::new(nx, ny, nz)),
            Some(actnum) => {
                let location = actnum.location();
                let items = actnum
                    .record(0)
                    .filter(|_| actnum.is_data_keyword())
                    .ok_or_else(|| FieldPropsError::input("ACTNUM is not a data keyword", &location))?
                    .items();
                let flags = items
                    .iter()
                    .map(|item| match item {
                        DeckItem::Defaulted => Ok(1),
                        other => other.as_int().ok_or_else(|| {
                            FieldPropsError::input("ACTNUM items must be integers", &location)
                        }),
                    })
                    .collect::<Result<Vec<i32>>>()?;
                Self::with_actnum(nx, ny, nz, &flags).map_err(|e| e.at(&location))
            }
        }
    }

    /// Number of cells along i
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of cells along j
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Number of cells along k
    #[inline]
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Total number of cells, active or not
    #[inline]
    pub fn cartesian_size(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Global index of cell (i, j, k)
    #[inline]
    pub fn global_index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.nx * (j + self.ny * k)
    }

    /// Inverse of [`Self::global_index`]
    #[inline]
    pub fn ijk(&self, global: usize) -> (usize, usize, usize) {
        let i = global % self.nx;
        let j = (global / self.nx) % self.ny;
        let k = global / (self.nx * self.ny);
        (i, j, k)
    }

    /// True if cell (i, j, k) exists and is active
    pub fn cell_active(&self, i: usize, j: usize, k: usize) -> bool {
        i < self.nx && j < self.ny && k < self.nz && self.is_active(self.global_index(i, j, k))
    }

    /// True if the cell with this global index exists and is active
    #[inline]
    pub fn is_active(&self, global: usize) -> bool {
        matches!(self.global_to_active.get(global), Some(Some(_)))
    }

    /// Active index → global index map, ascending
    #[inline]
    pub fn active_map(&self) -> &[usize] {
        &self.active_to_global
    }

    /// Number of active cells
    #[inline]
    pub fn num_active(&self) -> usize {
        self.active_to_global.len()
    }

    /// Global index of the cell with active index `active`
    ///
    /// # Panics
    /// Panics if `active >= self.num_active()`
    #[inline]
    pub fn global_index_of_active(&self, active: usize) -> usize {
        self.active_to_global[active]
    }

    /// Active index of a global cell, `None` for inactive cells
    #[inline]
    pub fn active_index(&self, global: usize) -> Option<usize> {
        self.global_to_active.get(global).copied().flatten()
    }
}
