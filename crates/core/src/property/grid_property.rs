//! Per-cell property arrays
//!
//! A [`GridProperty`] stores one value per cartesian cell, always addressed by
//! global index, together with a flag per cell recording whether the value is
//! still a default. Edits are scoped by a [`GridBox`]; active-cell views are
//! computed on demand from a [`CartesianGrid`].
//!
//! # Defaulted flags
//! - Loading an explicit item, `set_scalar`, `min_value`, `max_value` and
//!   `masked_set` mark the touched cells as explicitly set.
//! - `add`, `scale`, `masked_add`, `masked_scale` and `multiply_with` leave
//!   the flags alone: arithmetic on a default value is still a default.
//! - `copy_from` copies the source flags along with the values.
//! - `fill_defaulted` only writes cells that are still defaulted.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::PropertyValue;
use crate::deck::{DeckItem, DeckKeyword, Measure, UnitSystem};
use crate::error::{FieldPropsError, Result};
use crate::grid::{CartesianGrid, GridBox};

/// Static description of a keyword a registry can materialize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: PropertyValue")]
pub struct SupportedKeywordInfo<T> {
    name: String,
    default_value: T,
    dimension: String,
    /// Arithmetic modifiers may act on the default fill when the deck never
    /// supplied the keyword
    #[serde(default)]
    default_initializable: bool,
    #[serde(default)]
    limits: Option<(T, T)>,
}

impl<T: PropertyValue> SupportedKeywordInfo<T> {
    /// Describe keyword `name` with its default value and dimension string
    pub fn new(name: impl Into<String>, default_value: T, dimension: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_value,
            dimension: dimension.into(),
            default_initializable: false,
            limits: None,
        }
    }

    /// Allow ADD/MULTIPLY/COPY and friends on a property the deck never set
    pub fn with_default_initializable(mut self, initializable: bool) -> Self {
        self.default_initializable = initializable;
        self
    }

    /// Inclusive range every cell must lie in once the deck is processed
    pub fn with_limits(mut self, min: T, max: T) -> Self {
        self.limits = Some((min, max));
        self
    }

    /// Keyword name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value every cell starts with
    pub fn default_value(&self) -> T {
        self.default_value
    }

    /// Dimension string ("1", "Length", "Permeability", ...)
    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    /// Whether arithmetic may start from the default fill
    pub fn is_default_initializable(&self) -> bool {
        self.default_initializable
    }

    /// Configured value limits
    pub fn limits(&self) -> Option<(T, T)> {
        self.limits
    }

    /// Measure used for unit conversion of deck values
    ///
    /// # Errors
    /// Returns `InvalidArgument` for unknown dimension strings
    pub fn measure(&self) -> Result<Measure> {
        Measure::from_dimension(&self.dimension)
    }
}

/// One keyword's values over the full cartesian grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: PropertyValue")]
pub struct GridProperty<T> {
    info: SupportedKeywordInfo<T>,
    nx: usize,
    ny: usize,
    nz: usize,
    data: Vec<T>,
    defaulted: Vec<bool>,
}

impl<T: PropertyValue> GridProperty<T> {
    /// Create a property with every cell set to the keyword default
    pub fn new(nx: usize, ny: usize, nz: usize, info: SupportedKeywordInfo<T>) -> Self {
        let size = nx * ny * nz;
        Self {
            data: vec![info.default_value; size],
            defaulted: vec![true; size],
            info,
            nx,
            ny,
            nz,
        }
    }

    /// Keyword this property stores
    pub fn keyword_name(&self) -> &str {
        &self.info.name
    }

    /// Keyword configuration
    pub fn keyword_info(&self) -> &SupportedKeywordInfo<T> {
        &self.info
    }

    /// Dimension string of the stored values
    pub fn dimension(&self) -> &str {
        &self.info.dimension
    }

    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    #[inline]
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Number of cells, active or not
    #[inline]
    pub fn cartesian_size(&self) -> usize {
        self.data.len()
    }

    /// Raw values by global index
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Per-cell flags: true where the value is still a default
    #[inline]
    pub fn was_defaulted(&self) -> &[bool] {
        &self.defaulted
    }

    /// Replace all values; defaulted flags are left untouched
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `values` is not one entry per cell
    pub fn assign_data(&mut self, values: Vec<T>) -> Result<()> {
        self.check_len("assign_data", values.len())?;
        self.data = values;
        Ok(())
    }

    /// Overwrite the cells still flagged defaulted with `values[g]`
    ///
    /// Flags are unchanged: the cells keep counting as defaults.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `values` is not one entry per cell
    pub fn fill_defaulted(&mut self, values: &[T]) -> Result<()> {
        self.check_len("fill_defaulted", values.len())?;
        for ((v, &dflt), &fill) in self.data.iter_mut().zip(&self.defaulted).zip(values) {
            if dflt {
                *v = fill;
            }
        }
        Ok(())
    }

    /// True if any cell still holds NaN (never for integer properties)
    pub fn contains_nan(&self) -> bool {
        self.data.par_iter().any(|v| v.is_nan())
    }

    /// Load the whole grid from a flat data keyword
    ///
    /// Explicit items are converted to SI and mark their cell as set.
    /// Defaulted items keep the current value when `respect_defaults` is
    /// true, and reset the cell to the keyword default otherwise; either way
    /// the cell stays defaulted.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the keyword is not a data keyword, its
    /// item count differs from the cell count, or an item has the wrong type
    pub fn load_from_deck_keyword(
        &mut self,
        keyword: &DeckKeyword,
        units: UnitSystem,
        respect_defaults: bool,
    ) -> Result<()> {
        let items = self.data_items(keyword)?;
        if items.len() != self.cartesian_size() {
            return Err(FieldPropsError::invalid_argument(format!(
                "{} has {} items, grid has {} cells",
                keyword.name(),
                items.len(),
                self.cartesian_size()
            )));
        }
        self.load_items(items, 0..self.cartesian_size(), units, respect_defaults)
    }

    /// Load the cells of `grid_box` from a flat data keyword
    ///
    /// Item n lands on the n-th cell of `grid_box.indices()`.
    ///
    /// # Errors
    /// As [`Self::load_from_deck_keyword`], with the item count checked
    /// against the box size
    pub fn load_from_deck_keyword_in_box(
        &mut self,
        keyword: &DeckKeyword,
        grid_box: &GridBox,
        units: UnitSystem,
        respect_defaults: bool,
    ) -> Result<()> {
        self.check_box(grid_box)?;
        let items = self.data_items(keyword)?;
        if items.len() != grid_box.size() {
            return Err(FieldPropsError::invalid_argument(format!(
                "{} has {} items, box holds {} cells",
                keyword.name(),
                items.len(),
                grid_box.size()
            )));
        }
        self.load_items(items, grid_box.indices(), units, respect_defaults)
    }

    /// Copy values and defaulted flags of the cells in `grid_box` from `other`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the grids differ
    pub fn copy_from(&mut self, other: &GridProperty<T>, grid_box: &GridBox) -> Result<()> {
        self.check_same_grid(other)?;
        self.check_box(grid_box)?;
        for g in grid_box.indices() {
            self.data[g] = other.data[g];
            self.defaulted[g] = other.defaulted[g];
        }
        Ok(())
    }

    /// Assign `value` to every cell in `grid_box`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the box belongs to another grid
    pub fn set_scalar(&mut self, value: T, grid_box: &GridBox) -> Result<()> {
        self.check_box(grid_box)?;
        for g in grid_box.indices() {
            self.data[g] = value;
            self.defaulted[g] = false;
        }
        Ok(())
    }

    /// Add `shift` to every cell in `grid_box`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the box belongs to another grid or a sum
    /// overflows; the property is then left unchanged
    pub fn add(&mut self, shift: T, grid_box: &GridBox) -> Result<()> {
        self.check_box(grid_box)?;
        self.update_cells(grid_box.indices(), |v| v.try_add(shift))
    }

    /// Multiply every cell in `grid_box` by `factor`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the box belongs to another grid or a
    /// product overflows; the property is then left unchanged
    pub fn scale(&mut self, factor: T, grid_box: &GridBox) -> Result<()> {
        self.check_box(grid_box)?;
        self.update_cells(grid_box.indices(), |v| v.try_mul(factor))
    }

    /// Raise every cell in `grid_box` to at least `min`; NaN cells take `min`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the box belongs to another grid
    pub fn min_value(&mut self, min: T, grid_box: &GridBox) -> Result<()> {
        self.check_box(grid_box)?;
        for g in grid_box.indices() {
            if self.data[g].is_nan() || self.data[g] < min {
                self.data[g] = min;
            }
            self.defaulted[g] = false;
        }
        Ok(())
    }

    /// Lower every cell in `grid_box` to at most `max`; NaN cells take `max`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the box belongs to another grid
    pub fn max_value(&mut self, max: T, grid_box: &GridBox) -> Result<()> {
        self.check_box(grid_box)?;
        for g in grid_box.indices() {
            if self.data[g].is_nan() || self.data[g] > max {
                self.data[g] = max;
            }
            self.defaulted[g] = false;
        }
        Ok(())
    }

    /// Elementwise product with another property over the full grid
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the grids differ or a product overflows
    pub fn multiply_with(&mut self, other: &GridProperty<T>) -> Result<()> {
        self.check_same_grid(other)?;
        self.data = self
            .data
            .par_iter()
            .zip(other.data.par_iter())
            .map(|(&v, &f)| v.try_mul(f))
            .collect::<Result<Vec<T>>>()?;
        Ok(())
    }

    /// Check that every cell lies in `[min, max]`
    ///
    /// # Errors
    /// Returns `InvalidArgument` naming the first offending cell
    pub fn check_limits(&self, min: T, max: T) -> Result<()> {
        match self.data.par_iter().position_first(|&v| v < min || v > max) {
            None => Ok(()),
            Some(g) => Err(FieldPropsError::invalid_argument(format!(
                "{}: cell {g} value {} is outside [{min}, {max}]",
                self.info.name, self.data[g]
            ))),
        }
    }

    /// Mask with `true` where a cell currently equals `value`
    pub fn init_mask(&self, value: T) -> Vec<bool> {
        self.data.iter().map(|&v| v == value).collect()
    }

    /// Assign `value` where `mask` is set
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the mask is not one entry per cell
    pub fn masked_set(&mut self, value: T, mask: &[bool]) -> Result<()> {
        self.check_len("mask", mask.len())?;
        for ((v, dflt), &m) in self.data.iter_mut().zip(&mut self.defaulted).zip(mask) {
            if m {
                *v = value;
                *dflt = false;
            }
        }
        Ok(())
    }

    /// Add `shift` where `mask` is set
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the mask is not one entry per cell or a
    /// sum overflows
    pub fn masked_add(&mut self, shift: T, mask: &[bool]) -> Result<()> {
        self.check_len("mask", mask.len())?;
        self.update_cells(masked_cells(mask), |v| v.try_add(shift))
    }

    /// Multiply by `factor` where `mask` is set
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the mask is not one entry per cell or a
    /// product overflows
    pub fn masked_scale(&mut self, factor: T, mask: &[bool]) -> Result<()> {
        self.check_len("mask", mask.len())?;
        self.update_cells(masked_cells(mask), |v| v.try_mul(factor))
    }

    /// Ascending indices of active cells equal to `value`
    ///
    /// With `use_active` the result is numbered by active index. Without it
    /// every cell is considered and global indices are returned, exactly as
    /// [`Self::index_equal`].
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the grid has a different cell count
    pub fn cells_equal(&self, value: T, grid: &CartesianGrid, use_active: bool) -> Result<Vec<usize>> {
        self.check_len("grid", grid.cartesian_size())?;
        if use_active {
            self.cells_equal_in_map(value, grid.active_map())
        } else {
            Ok(self.index_equal(value))
        }
    }

    /// Ascending active indices `a` with `data[active_map[a]] == value`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the map references a cell outside the grid
    pub fn cells_equal_in_map(&self, value: T, active_map: &[usize]) -> Result<Vec<usize>> {
        let mut cells = Vec::new();
        for (active, &g) in active_map.iter().enumerate() {
            let v = self.data.get(g).ok_or_else(|| {
                FieldPropsError::invalid_argument(format!(
                    "active map entry {active} points at cell {g} outside the grid"
                ))
            })?;
            if *v == value {
                cells.push(active);
            }
        }
        Ok(cells)
    }

    /// Ascending global indices of cells equal to `value`
    pub fn index_equal(&self, value: T) -> Vec<usize> {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(g, &v)| (v == value).then_some(g))
            .collect()
    }

    /// Values of the active cells, in active-index order
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the grid has a different cell count
    pub fn compressed_copy(&self, grid: &CartesianGrid) -> Result<Vec<T>> {
        self.check_len("grid", grid.cartesian_size())?;
        Ok(grid.active_map().par_iter().map(|&g| self.data[g]).collect())
    }

    fn data_items<'k>(&self, keyword: &'k DeckKeyword) -> Result<&'k [DeckItem]> {
        match keyword.record(0) {
            Some(record) if keyword.is_data_keyword() => Ok(record.items()),
            _ => Err(FieldPropsError::invalid_argument(format!(
                "{} is not a flat data keyword with one record ({} records) and cannot be loaded into {}",
                keyword.name(),
                keyword.records().len(),
                self.info.name
            ))),
        }
    }

    /// Convert every item first so a bad item leaves the property untouched
    fn load_items(
        &mut self,
        items: &[DeckItem],
        cells: impl Iterator<Item = usize>,
        units: UnitSystem,
        respect_defaults: bool,
    ) -> Result<()> {
        let measure = self.info.measure()?;
        let values = items
            .iter()
            .map(|item| {
                if item.is_defaulted() {
                    Ok(None)
                } else {
                    T::from_item(item, units, measure).map(Some)
                }
            })
            .collect::<Result<Vec<Option<T>>>>()?;

        for (g, value) in cells.zip(values) {
            match value {
                Some(v) => {
                    self.data[g] = v;
                    self.defaulted[g] = false;
                }
                None => {
                    if !respect_defaults {
                        self.data[g] = self.info.default_value;
                    }
                    self.defaulted[g] = true;
                }
            }
        }
        Ok(())
    }

    /// Compute every new value before writing any of them
    fn update_cells(
        &mut self,
        cells: impl Iterator<Item = usize>,
        op: impl Fn(T) -> Result<T>,
    ) -> Result<()> {
        let updated = cells
            .map(|g| op(self.data[g]).map(|v| (g, v)))
            .collect::<Result<Vec<_>>>()?;
        for (g, v) in updated {
            self.data[g] = v;
        }
        Ok(())
    }

    fn check_len(&self, what: &str, len: usize) -> Result<()> {
        if len == self.cartesian_size() {
            Ok(())
        } else {
            Err(FieldPropsError::invalid_argument(format!(
                "{}: {what} has {len} entries, property has {} cells",
                self.info.name,
                self.cartesian_size()
            )))
        }
    }

    fn check_same_grid(&self, other: &GridProperty<T>) -> Result<()> {
        if (self.nx, self.ny, self.nz) == (other.nx, other.ny, other.nz) {
            Ok(())
        } else {
            Err(FieldPropsError::invalid_argument(format!(
                "{} is {}x{}x{} but {} is {}x{}x{}",
                self.info.name, self.nx, self.ny, self.nz, other.info.name, other.nx, other.ny, other.nz
            )))
        }
    }

    fn check_box(&self, grid_box: &GridBox) -> Result<()> {
        if grid_box.dims() == [self.nx, self.ny, self.nz] {
            Ok(())
        } else {
            let [bx, by, bz] = grid_box.dims();
            Err(FieldPropsError::invalid_argument(format!(
                "{}: box built for a {bx}x{by}x{bz} grid, property is {}x{}x{}",
                self.info.name, self.nx, self.ny, self.nz
            )))
        }
    }
}

fn masked_cells(mask: &[bool]) -> impl Iterator<Item = usize> + '_ {
    mask.iter().enumerate().filter_map(|(g, &m)| m.then_some(g))
}
