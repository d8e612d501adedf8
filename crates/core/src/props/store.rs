//! Property store driven by deck content
//!
//! [`PropertyStore`] owns the integer and double registries of one case
//! together with the grid, unit system and saturation tables they depend on.
//! Both query facades sit on top of it.

use std::borrow::Cow;

use tracing::{debug, info, warn};

use crate::config::FieldPropsConfig;
use crate::deck::{Deck, UnitSystem};
use crate::error::Result;
use crate::grid::CartesianGrid;
use crate::property::{GridProperties, GridProperty, PropertyValue, SupportedKeywordInfo};
use crate::tables::{derive_endpoint, EndpointKeyword, TableManager};

/// Element types the store keeps a registry for
pub trait StoredValue: PropertyValue {
    /// Registry holding properties of this type
    fn registry(store: &PropertyStore) -> &GridProperties<Self>;

    /// Mutable registry holding properties of this type
    fn registry_mut(store: &mut PropertyStore) -> &mut GridProperties<Self>;

    /// Values a newly materialized property starts from instead of its
    /// default fill, if any
    ///
    /// # Errors
    /// Propagates failures of whatever computes the values
    fn initial_values(_store: &PropertyStore, _name: &str) -> Result<Option<Vec<Self>>> {
        Ok(None)
    }
}

impl StoredValue for i32 {
    fn registry(store: &PropertyStore) -> &GridProperties<Self> {
        &store.int_props
    }

    fn registry_mut(store: &mut PropertyStore) -> &mut GridProperties<Self> {
        &mut store.int_props
    }
}

impl StoredValue for f64 {
    fn registry(store: &PropertyStore) -> &GridProperties<Self> {
        &store.double_props
    }

    fn registry_mut(store: &mut PropertyStore) -> &mut GridProperties<Self> {
        &mut store.double_props
    }

    fn initial_values(store: &PropertyStore, name: &str) -> Result<Option<Vec<Self>>> {
        store.derived_endpoint(name)
    }
}

/// Which registry a keyword lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Int,
    Double,
}

/// Grid properties of one case
#[derive(Debug, Clone)]
pub struct PropertyStore {
    pub(super) grid: CartesianGrid,
    pub(super) units: UnitSystem,
    pub(super) tables: TableManager,
    pub(super) config: FieldPropsConfig,
    pub(super) int_props: GridProperties<i32>,
    pub(super) double_props: GridProperties<f64>,
    /// Set while a deck is being applied; end-point derivation waits until
    /// the region arrays are final
    pub(super) in_deck: bool,
}

impl PropertyStore {
    /// Create an empty store
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the keyword tables in `config` are invalid
    pub fn new(
        grid: CartesianGrid,
        units: UnitSystem,
        tables: TableManager,
        config: FieldPropsConfig,
    ) -> Result<Self> {
        config.validate()?;
        let int_props = GridProperties::new(&grid, config.int_keywords.clone());
        let double_props = GridProperties::new(&grid, config.double_keywords.clone());
        Ok(Self {
            grid,
            units,
            tables,
            config,
            int_props,
            double_props,
            in_deck: false,
        })
    }

    /// Build grid, tables and properties from a deck
    ///
    /// The deck is processed in order, then the result is checked as
    /// described in [`Self::check_properties`].
    ///
    /// # Errors
    /// Returns the first error met while building the grid, reading tables or
    /// applying a keyword
    pub fn from_deck(deck: &Deck, config: FieldPropsConfig) -> Result<Self> {
        let grid = CartesianGrid::from_deck(deck)?;
        let tables = TableManager::from_deck(deck)?;
        let mut store = Self::new(grid, deck.unit_system(), tables, config)?;
        store.process_deck(deck)?;
        store.check_properties()?;

        info!(
            cells = store.grid.cartesian_size(),
            active = store.grid.num_active(),
            int_properties = store.int_props.len(),
            double_properties = store.double_props.len(),
            "field properties loaded"
        );
        Ok(store)
    }

    pub fn grid(&self) -> &CartesianGrid {
        &self.grid
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn tables(&self) -> &TableManager {
        &self.tables
    }

    pub fn config(&self) -> &FieldPropsConfig {
        &self.config
    }

    /// Integer registry
    pub fn int_properties(&self) -> &GridProperties<i32> {
        &self.int_props
    }

    /// Double registry
    pub fn double_properties(&self) -> &GridProperties<f64> {
        &self.double_props
    }

    /// Registry a keyword belongs to, `None` if neither table knows it
    pub fn element_type(&self, name: &str) -> Option<ElementType> {
        if self.int_props.supports_keyword(name) {
            Some(ElementType::Int)
        } else if self.double_props.supports_keyword(name) {
            Some(ElementType::Double)
        } else {
            None
        }
    }

    /// True if the `T` table knows `name`
    pub fn supports<T: StoredValue>(&self, name: &str) -> bool {
        T::registry(self).supports_keyword(name)
    }

    /// True if a `T` property for `name` has been materialized
    pub fn contains<T: StoredValue>(&self, name: &str) -> bool {
        T::registry(self).has_keyword(name)
    }

    /// Materialized property only
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `name` has not been materialized
    pub fn deck_property<T: StoredValue>(&self, name: &str) -> Result<&GridProperty<T>> {
        T::registry(self).get_deck_keyword(name)
    }

    /// Property for `name`, materialized if absent
    ///
    /// End-point keywords are filled from the saturation tables when they
    /// are materialized here.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `name` is not supported for `T`
    pub fn property<T: StoredValue>(&mut self, name: &str) -> Result<&GridProperty<T>> {
        self.property_mut::<T>(name).map(|prop| &*prop)
    }

    /// Mutable variant of [`Self::property`]
    ///
    /// # Errors
    /// As [`Self::property`]
    pub fn property_mut<T: StoredValue>(&mut self, name: &str) -> Result<&mut GridProperty<T>> {
        self.materialize::<T>(name)?;
        T::registry_mut(self).get_keyword(name)
    }

    /// Property used as an arithmetic operand
    ///
    /// Absent keywords are materialized only when default-initializable.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `name` is unsupported, or absent and not
    /// default-initializable
    pub fn initialized_property<T: StoredValue>(
        &mut self,
        name: &str,
    ) -> Result<&mut GridProperty<T>> {
        let initializable = T::registry(self)
            .keyword_info(name)
            .is_some_and(SupportedKeywordInfo::is_default_initializable);
        if initializable {
            self.materialize::<T>(name)?;
        }
        T::registry_mut(self).get_initialized_keyword(name)
    }

    /// Check limits and report NaN cells, as enabled in the configuration
    ///
    /// # Errors
    /// Returns `InvalidArgument` for the first property outside its limits
    pub fn check_properties(&self) -> Result<()> {
        if self.config.check_limits {
            check_registry_limits(&self.int_props)?;
            check_registry_limits(&self.double_props)?;
        }

        if self.config.warn_on_nan {
            for prop in self.double_props.iter().filter(|p| p.contains_nan()) {
                let missing = prop
                    .compressed_copy(&self.grid)?
                    .iter()
                    .filter(|v| v.is_nan())
                    .count();
                warn!(
                    keyword = prop.keyword_name(),
                    active_cells_without_value = missing,
                    "property still holds NaN after deck processing"
                );
            }
        }
        Ok(())
    }

    /// Materialize `name` if absent
    ///
    /// Outside deck processing, end-points start from their derived values.
    pub(super) fn materialize<T: StoredValue>(&mut self, name: &str) -> Result<()> {
        let registry = T::registry(self);
        if registry.has_keyword(name) || !registry.supports_keyword(name) {
            return Ok(());
        }

        let initial = if self.in_deck {
            None
        } else {
            T::initial_values(self, name)?
        };
        let prop = T::registry_mut(self).get_keyword(name)?;
        if let Some(values) = initial {
            prop.fill_defaulted(&values)?;
        }
        Ok(())
    }

    /// Fill the still-defaulted cells of every materialized end-point from
    /// the saturation tables, using the final region arrays
    pub(super) fn fill_derived_endpoints(&mut self) -> Result<()> {
        for name in EndpointKeyword::all_names() {
            if !self.double_props.has_keyword(&name) {
                continue;
            }
            if let Some(values) = self.derived_endpoint(&name)? {
                self.double_props.get_keyword(&name)?.fill_defaulted(&values)?;
                debug!(keyword = %name, "filled defaulted cells from saturation tables");
            }
        }
        Ok(())
    }

    fn derived_endpoint(&self, name: &str) -> Result<Option<Vec<f64>>> {
        if !self.config.derive_endpoints {
            return Ok(None);
        }
        let Some(keyword) = EndpointKeyword::parse(name) else {
            return Ok(None);
        };

        let region_name = keyword.region_keyword();
        let regions: Cow<'_, [i32]> = match self.int_props.get_deck_keyword(region_name) {
            Ok(prop) => Cow::Borrowed(prop.data()),
            Err(_) => {
                debug!(keyword = name, regions = region_name, "region array absent, using region 1");
                Cow::Owned(vec![1; self.grid.cartesian_size()])
            }
        };

        derive_endpoint(keyword, &self.tables, &regions, &self.grid)
    }
}

fn check_registry_limits<T: PropertyValue>(registry: &GridProperties<T>) -> Result<()> {
    for prop in registry.iter() {
        if let Some((min, max)) = prop.keyword_info().limits() {
            prop.check_limits(min, max)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{SatFuncTable, SatRow};

    fn swof(rows: &[[f64; 3]]) -> SatFuncTable {
        SatFuncTable::new(
            rows.iter()
                .map(|r| SatRow {
                    sat: r[0],
                    kr_phase: r[1],
                    kr_oil: r[2],
                    pc: 0.0,
                })
                .collect(),
        )
        .unwrap()
    }

    fn store() -> PropertyStore {
        let tables = TableManager::new(
            vec![
                swof(&[[0.1, 0.0, 1.0], [0.9, 1.0, 0.0]]),
                swof(&[[0.2, 0.0, 1.0], [0.8, 1.0, 0.0]]),
            ],
            Vec::new(),
        );
        PropertyStore::new(
            CartesianGrid::new(2, 1, 1),
            UnitSystem::Metric,
            tables,
            FieldPropsConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_element_type() {
        let store = store();
        assert_eq!(store.element_type("FIPNUM"), Some(ElementType::Int));
        assert_eq!(store.element_type("PORO"), Some(ElementType::Double));
        assert_eq!(store.element_type("NONONO"), None);
        assert!(store.supports::<f64>("SWL"));
        assert!(!store.supports::<i32>("SWL"));
    }

    #[test]
    fn test_endpoint_derived_on_materialize() {
        let mut store = store();
        store
            .property_mut::<i32>("SATNUM")
            .unwrap()
            .assign_data(vec![2, 1])
            .unwrap();

        let swl = store.property::<f64>("SWL").unwrap();
        assert_eq!(swl.data(), &[0.2, 0.1]);
        assert!(swl.was_defaulted().iter().all(|&d| d));

        // No SATNUM for imbibition means region 1 everywhere
        assert_eq!(store.property::<f64>("ISWU").unwrap().data(), &[0.9, 0.9]);
        assert!(!store.contains::<i32>("IMBNUM"));

        // No SGOF tables: default fill stays
        assert!(store.property::<f64>("SGU").unwrap().contains_nan());
    }

    #[test]
    fn test_initialized_property_policy() {
        let mut store = store();
        assert!(store.initialized_property::<f64>("PORO").is_err());
        assert!(!store.contains::<f64>("PORO"));
        assert_eq!(store.initialized_property::<f64>("NTG").unwrap().data(), &[1.0, 1.0]);
        assert!(store.initialized_property::<i32>("PORO").is_err());
    }

    #[test]
    fn test_check_properties_limits() {
        let mut store = store();
        store
            .property_mut::<f64>("PORO")
            .unwrap()
            .assign_data(vec![0.2, 1.5])
            .unwrap();
        assert!(store.check_properties().is_err());

        store.config.check_limits = false;
        store.check_properties().unwrap();
    }
}
