//! Rectangular cell ranges used to scope property edits
//!
//! A [`GridBox`] holds inclusive 0-based (i, j, k) ranges. Deck keywords use
//! 1-based bounds where any bound may be defaulted; those come in through
//! [`GridBox::from_deck_bounds`].

use serde::{Deserialize, Serialize};

use super::CartesianGrid;
use crate::error::{FieldPropsError, Result};

/// Inclusive index ranges over a grid of fixed dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBox {
    dims: [usize; 3],
    i: (usize, usize),
    j: (usize, usize),
    k: (usize, usize),
}

impl GridBox {
    /// Box covering the whole grid
    pub fn global(grid: &CartesianGrid) -> Self {
        Self::whole(grid.nx(), grid.ny(), grid.nz())
    }

    /// Box covering a whole grid of the given dimensions
    pub fn whole(nx: usize, ny: usize, nz: usize) -> Self {
        Self {
            dims: [nx, ny, nz],
            i: (0, nx.saturating_sub(1)),
            j: (0, ny.saturating_sub(1)),
            k: (0, nz.saturating_sub(1)),
        }
    }

    /// Box over inclusive 0-based ranges
    ///
    /// # Errors
    /// Returns `InvalidArgument` if a range is reversed or leaves the grid
    pub fn new(
        grid: &CartesianGrid,
        i1: usize,
        i2: usize,
        j1: usize,
        j2: usize,
        k1: usize,
        k2: usize,
    ) -> Result<Self> {
        let dims = [grid.nx(), grid.ny(), grid.nz()];
        let ranges = [(i1, i2), (j1, j2), (k1, k2)];
        for (axis, ((lo, hi), n)) in ranges.iter().zip(dims).enumerate() {
            if lo > hi || *hi >= n {
                return Err(FieldPropsError::invalid_argument(format!(
                    "box range {lo}..={hi} on axis {} is outside [0, {n})",
                    ['i', 'j', 'k'][axis]
                )));
            }
        }

        Ok(Self {
            dims,
            i: (i1, i2),
            j: (j1, j2),
            k: (k1, k2),
        })
    }

    /// Box from 1-based deck bounds `[i1, i2, j1, j2, k1, k2]`
    ///
    /// `None` bounds are taken from `enclosing`, which is the active BOX or
    /// the whole grid.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for bounds below 1 or outside the grid
    pub fn from_deck_bounds(
        grid: &CartesianGrid,
        enclosing: &GridBox,
        bounds: [Option<i32>; 6],
    ) -> Result<Self> {
        let fallback = [
            enclosing.i.0,
            enclosing.i.1,
            enclosing.j.0,
            enclosing.j.1,
            enclosing.k.0,
            enclosing.k.1,
        ];

        let mut zero_based = [0usize; 6];
        for (slot, (bound, dflt)) in zero_based.iter_mut().zip(bounds.iter().zip(fallback)) {
            *slot = match bound {
                None => dflt,
                Some(b) if *b >= 1 => (*b - 1) as usize,
                Some(b) => {
                    return Err(FieldPropsError::invalid_argument(format!(
                        "box bound {b} is not a positive 1-based index"
                    )))
                }
            };
        }

        let [i1, i2, j1, j2, k1, k2] = zero_based;
        Self::new(grid, i1, i2, j1, j2, k1, k2)
    }

    /// Global indices covered, i fastest, then j, then k
    pub fn indices(&self) -> impl Iterator<Item = usize> {
        let [nx, ny, _] = self.dims;
        let (i1, i2) = self.i;
        let (j1, j2) = self.j;
        (self.k.0..=self.k.1).flat_map(move |k| {
            (j1..=j2).flat_map(move |j| (i1..=i2).map(move |i| i + nx * (j + ny * k)))
        })
    }

    /// True if the box spans the entire grid
    pub fn is_global(&self) -> bool {
        let [nx, ny, nz] = self.dims;
        self.i == (0, nx.saturating_sub(1))
            && self.j == (0, ny.saturating_sub(1))
            && self.k == (0, nz.saturating_sub(1))
    }

    /// Number of cells covered
    pub fn size(&self) -> usize {
        (self.i.1 - self.i.0 + 1) * (self.j.1 - self.j.0 + 1) * (self.k.1 - self.k.0 + 1)
    }

    /// Dimensions of the grid the box was built for
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Cell count of the grid the box was built for
    #[inline]
    pub fn cartesian_size(&self) -> usize {
        self.dims.iter().product()
    }

    /// Inclusive i range
    pub fn i_range(&self) -> (usize, usize) {
        self.i
    }

    /// Inclusive j range
    pub fn j_range(&self) -> (usize, usize) {
        self.j
    }

    /// Inclusive k range
    pub fn k_range(&self) -> (usize, usize) {
        self.k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_box() {
        let grid = CartesianGrid::new(4, 4, 2);
        let global = GridBox::global(&grid);

        assert!(global.is_global());
        assert_eq!(global.size(), 32);
        assert_eq!(global.indices().collect::<Vec<_>>(), (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn test_sub_box_order() {
        let grid = CartesianGrid::new(4, 4, 2);
        let sub = GridBox::new(&grid, 1, 2, 0, 1, 1, 1).unwrap();

        assert!(!sub.is_global());
        assert_eq!(sub.size(), 4);
        assert_eq!(sub.indices().collect::<Vec<_>>(), vec![17, 18, 21, 22]);
        // Restartable
        assert_eq!(sub.indices().count(), 4);
    }

    #[test]
    fn test_out_of_range() {
        let grid = CartesianGrid::new(4, 4, 2);
        assert!(GridBox::new(&grid, 0, 4, 0, 3, 0, 1).is_err());
        assert!(GridBox::new(&grid, 0, 3, 0, 3, 0, 2).is_err());
        assert!(GridBox::new(&grid, 2, 1, 0, 3, 0, 1).is_err());
    }

    #[test]
    fn test_deck_bounds_fall_back_to_enclosing() {
        let grid = CartesianGrid::new(5, 5, 3);
        let enclosing = GridBox::new(&grid, 1, 3, 0, 4, 2, 2).unwrap();

        let b = GridBox::from_deck_bounds(
            &grid,
            &enclosing,
            [None, None, Some(2), Some(2), None, None],
        )
        .unwrap();

        assert_eq!(b.i_range(), (1, 3));
        assert_eq!(b.j_range(), (1, 1));
        assert_eq!(b.k_range(), (2, 2));
    }

    #[test]
    fn test_deck_bounds_reject_zero() {
        let grid = CartesianGrid::new(2, 2, 2);
        let global = GridBox::global(&grid);
        assert!(GridBox::from_deck_bounds(&grid, &global, [Some(0), None, None, None, None, None]).is_err());
    }
}
