//! Deck keyword dispatch
//!
//! Walks the deck in order and applies each keyword that concerns grid
//! properties: flat data arrays, BOX / ENDBOX, the box operators
//! EQUALS / ADD / MULTIPLY / MINVALUE / MAXVALUE, COPY and the region
//! operators EQUALREG / ADDREG / MULTIREG. Every other keyword is skipped.

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use super::store::{ElementType, PropertyStore, StoredValue};
use crate::deck::{Deck, DeckItem, DeckKeyword, DeckRecord, Measure};
use crate::error::{FieldPropsError, Result};
use crate::grid::GridBox;

/// Operators acting on the cells of a box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxOperator {
    Equals,
    Add,
    Multiply,
    MinValue,
    MaxValue,
}

impl BoxOperator {
    /// Operator for a deck keyword name
    pub fn from_keyword(name: &str) -> Option<Self> {
        match name {
            "EQUALS" => Some(BoxOperator::Equals),
            "ADD" => Some(BoxOperator::Add),
            "MULTIPLY" => Some(BoxOperator::Multiply),
            "MINVALUE" => Some(BoxOperator::MinValue),
            "MAXVALUE" => Some(BoxOperator::MaxValue),
            _ => None,
        }
    }
}

/// Operators acting on the cells of one region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionOperator {
    Equals,
    Add,
    Multiply,
}

impl RegionOperator {
    /// Operator for a deck keyword name
    pub fn from_keyword(name: &str) -> Option<Self> {
        match name {
            "EQUALREG" => Some(RegionOperator::Equals),
            "ADDREG" => Some(RegionOperator::Add),
            "MULTIREG" => Some(RegionOperator::Multiply),
            _ => None,
        }
    }
}

/// Region array selected by the last item of a region operator record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionArray {
    #[default]
    Multnum,
    Fluxnum,
    Opernum,
}

impl RegionArray {
    /// Parse `M`, `F` or `O`
    ///
    /// # Errors
    /// Returns `InvalidArgument` for any other string
    pub fn from_item(item: &str) -> Result<Self> {
        match item.trim().to_ascii_uppercase().as_str() {
            "M" => Ok(RegionArray::Multnum),
            "F" => Ok(RegionArray::Fluxnum),
            "O" => Ok(RegionArray::Opernum),
            other => Err(FieldPropsError::invalid_argument(format!(
                "region array '{other}' is not one of M, F or O"
            ))),
        }
    }

    /// Integer keyword holding the regions
    pub fn keyword(self) -> &'static str {
        match self {
            RegionArray::Multnum => "MULTNUM",
            RegionArray::Fluxnum => "FLUXNUM",
            RegionArray::Opernum => "OPERNUM",
        }
    }
}

impl PropertyStore {
    /// Apply every property keyword of `deck` in order, then derive the
    /// defaulted cells of end-point properties
    ///
    /// # Errors
    /// Returns an `Input` error located at the first keyword that fails
    pub fn process_deck(&mut self, deck: &Deck) -> Result<()> {
        self.in_deck = true;
        let applied = self.apply_keywords(deck);
        self.in_deck = false;
        applied?;
        self.fill_derived_endpoints()
    }

    fn apply_keywords(&mut self, deck: &Deck) -> Result<()> {
        let mut input_box: Option<GridBox> = None;
        for keyword in deck.keywords() {
            self.process_keyword(keyword, &mut input_box)
                .map_err(|e| e.at(&keyword.location()))?;
        }
        if input_box.is_some() {
            warn!("deck ends inside a BOX section without ENDBOX");
        }
        Ok(())
    }

    fn process_keyword(&mut self, keyword: &DeckKeyword, input_box: &mut Option<GridBox>) -> Result<()> {
        let name = keyword.name();
        if let Some(op) = BoxOperator::from_keyword(name) {
            let enclosing = self.enclosing_box(*input_box);
            for record in keyword.records() {
                self.apply_box_record(op, record, &enclosing)?;
            }
            return Ok(());
        }
        if let Some(op) = RegionOperator::from_keyword(name) {
            for record in keyword.records() {
                self.apply_region_record(op, record)?;
            }
            return Ok(());
        }

        match name {
            "BOX" => {
                let record = keyword
                    .record(0)
                    .ok_or_else(|| FieldPropsError::invalid_argument("BOX has no record"))?;
                let whole = GridBox::global(&self.grid);
                let grid_box = GridBox::from_deck_bounds(&self.grid, &whole, deck_bounds(record, 0)?)?;
                debug!(cells = grid_box.size(), "entering BOX section");
                *input_box = Some(grid_box);
            }
            "ENDBOX" => *input_box = None,
            "COPY" => self.apply_copy(keyword, *input_box)?,
            // The loader rejects property keywords that are not one flat record
            _ => match self.element_type(name) {
                Some(ElementType::Int) => self.load_data_keyword::<i32>(keyword, *input_box)?,
                Some(ElementType::Double) => self.load_data_keyword::<f64>(keyword, *input_box)?,
                None if keyword.is_data_keyword() => {
                    debug!(keyword = name, "data keyword is not a grid property, skipped");
                }
                None => {}
            },
        }
        Ok(())
    }

    fn enclosing_box(&self, input_box: Option<GridBox>) -> GridBox {
        input_box.unwrap_or_else(|| GridBox::global(&self.grid))
    }

    fn load_data_keyword<T: StoredValue>(
        &mut self,
        keyword: &DeckKeyword,
        input_box: Option<GridBox>,
    ) -> Result<()> {
        let name = keyword.name();
        let respect_defaults = self.contains::<T>(name);

        let units = self.units;
        let prop = self.property_mut::<T>(name)?;
        if let Some(grid_box) = input_box {
            prop.load_from_deck_keyword_in_box(keyword, &grid_box, units, respect_defaults)?;
        } else {
            prop.load_from_deck_keyword(keyword, units, respect_defaults)?;
        }
        debug!(keyword = name, respect_defaults, "loaded data keyword");
        Ok(())
    }

    fn apply_box_record(&mut self, op: BoxOperator, record: &DeckRecord, enclosing: &GridBox) -> Result<()> {
        let target = record_str(record, 0, "property name")?;
        let value = record_item(record, 1, "value")?;
        let grid_box = GridBox::from_deck_bounds(&self.grid, enclosing, deck_bounds(record, 2)?)?;

        match self.element_type(target) {
            Some(ElementType::Int) => self.apply_box_operator::<i32>(op, target, value, &grid_box),
            Some(ElementType::Double) => self.apply_box_operator::<f64>(op, target, value, &grid_box),
            None => Err(unknown_keyword(target)),
        }
    }

    fn apply_box_operator<T: StoredValue>(
        &mut self,
        op: BoxOperator,
        name: &str,
        item: &DeckItem,
        grid_box: &GridBox,
    ) -> Result<()> {
        let units = self.units;
        let prop = if op == BoxOperator::Equals {
            self.property_mut::<T>(name)?
        } else {
            self.initialized_property::<T>(name)?
        };
        let measure = if op == BoxOperator::Multiply {
            Measure::Identity
        } else {
            prop.keyword_info().measure()?
        };
        let value = T::from_item(item, units, measure)?;

        match op {
            BoxOperator::Equals => prop.set_scalar(value, grid_box),
            BoxOperator::Add => prop.add(value, grid_box),
            BoxOperator::Multiply => prop.scale(value, grid_box),
            BoxOperator::MinValue => prop.min_value(value, grid_box),
            BoxOperator::MaxValue => prop.max_value(value, grid_box),
        }
    }

    fn apply_copy(&mut self, keyword: &DeckKeyword, input_box: Option<GridBox>) -> Result<()> {
        let enclosing = self.enclosing_box(input_box);
        let mut targets = FxHashSet::default();

        for record in keyword.records() {
            let src = record_str(record, 0, "source")?;
            let dst = record_str(record, 1, "target")?;
            if !targets.insert(dst) {
                return Err(FieldPropsError::invalid_argument(format!(
                    "{dst} is the target of more than one COPY record"
                )));
            }
            let grid_box = GridBox::from_deck_bounds(&self.grid, &enclosing, deck_bounds(record, 2)?)?;

            match (self.element_type(src), self.element_type(dst)) {
                (Some(ElementType::Int), Some(ElementType::Int)) => self.copy::<i32>(src, dst, &grid_box)?,
                (Some(ElementType::Double), Some(ElementType::Double)) => {
                    self.copy::<f64>(src, dst, &grid_box)?;
                }
                (None, _) => return Err(unknown_keyword(src)),
                (_, None) => return Err(unknown_keyword(dst)),
                _ => {
                    return Err(FieldPropsError::invalid_argument(format!(
                        "cannot copy {src} into {dst}: element types differ"
                    )))
                }
            }
        }
        Ok(())
    }

    fn copy<T: StoredValue>(&mut self, src: &str, dst: &str, grid_box: &GridBox) -> Result<()> {
        self.initialized_property::<T>(src)?;
        self.materialize::<T>(dst)?;
        T::registry_mut(self).copy_keyword(src, dst, grid_box)
    }

    fn apply_region_record(&mut self, op: RegionOperator, record: &DeckRecord) -> Result<()> {
        let target = record_str(record, 0, "property name")?;
        let value = record_item(record, 1, "value")?;
        let region = record_item(record, 2, "region number")?
            .as_int()
            .ok_or_else(|| FieldPropsError::invalid_argument("region number must be an integer"))?;
        let array = match record.item(3) {
            None | Some(DeckItem::Defaulted) => RegionArray::default(),
            Some(item) => RegionArray::from_item(item.as_str().ok_or_else(|| {
                FieldPropsError::invalid_argument(format!("region array must be M, F or O, got {item:?}"))
            })?)?,
        };

        let mask = self.initialized_property::<i32>(array.keyword())?.init_mask(region);
        match self.element_type(target) {
            Some(ElementType::Int) => self.apply_region_operator::<i32>(op, target, value, &mask),
            Some(ElementType::Double) => self.apply_region_operator::<f64>(op, target, value, &mask),
            None => Err(unknown_keyword(target)),
        }
    }

    fn apply_region_operator<T: StoredValue>(
        &mut self,
        op: RegionOperator,
        name: &str,
        item: &DeckItem,
        mask: &[bool],
    ) -> Result<()> {
        let units = self.units;
        let prop = if op == RegionOperator::Equals {
            self.property_mut::<T>(name)?
        } else {
            self.initialized_property::<T>(name)?
        };
        let measure = if op == RegionOperator::Multiply {
            Measure::Identity
        } else {
            prop.keyword_info().measure()?
        };
        let value = T::from_item(item, units, measure)?;

        match op {
            RegionOperator::Equals => prop.masked_set(value, mask),
            RegionOperator::Add => prop.masked_add(value, mask),
            RegionOperator::Multiply => prop.masked_scale(value, mask),
        }
    }
}

fn unknown_keyword(name: &str) -> FieldPropsError {
    FieldPropsError::invalid_argument(format!("{name} is not a supported grid property"))
}

fn record_item<'r>(record: &'r DeckRecord, index: usize, what: &str) -> Result<&'r DeckItem> {
    record
        .item(index)
        .filter(|item| !item.is_defaulted())
        .ok_or_else(|| FieldPropsError::invalid_argument(format!("record item {} ({what}) is missing", index + 1)))
}

fn record_str<'r>(record: &'r DeckRecord, index: usize, what: &str) -> Result<&'r str> {
    record_item(record, index, what)?.as_str().ok_or_else(|| {
        FieldPropsError::invalid_argument(format!("record item {} ({what}) must be a keyword name", index + 1))
    })
}

/// Six optional 1-based box bounds starting at item `first`
fn deck_bounds(record: &DeckRecord, first: usize) -> Result<[Option<i32>; 6]> {
    let mut bounds = [None; 6];
    for (offset, bound) in bounds.iter_mut().enumerate() {
        *bound = match record.item(first + offset) {
            None | Some(DeckItem::Defaulted) => None,
            Some(DeckItem::Int(v)) => Some(*v),
            Some(other) => {
                return Err(FieldPropsError::invalid_argument(format!(
                    "box bound {} must be an integer, got {other:?}",
                    offset + 1
                )))
            }
        };
    }
    Ok(bounds)
}
