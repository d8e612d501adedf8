//! Query surface with the newer keyword policy
//!
//! Existence checks never fail. Values come back compressed to the active
//! cells unless the global array is asked for explicitly.

use super::store::{PropertyStore, StoredValue};
use crate::config::FieldPropsConfig;
use crate::deck::Deck;
use crate::error::{FieldPropsError, Result};
use crate::grid::CartesianGrid;
use crate::property::GridProperty;

/// Active-cell view of the properties of one case
#[derive(Debug, Clone)]
pub struct FieldProps {
    store: PropertyStore,
}

impl FieldProps {
    /// Wrap an already processed store
    pub fn new(store: PropertyStore) -> Self {
        Self { store }
    }

    /// Process `deck` and wrap the result
    ///
    /// # Errors
    /// As [`PropertyStore::from_deck`]
    pub fn from_deck(deck: &Deck, config: FieldPropsConfig) -> Result<Self> {
        PropertyStore::from_deck(deck, config).map(Self::new)
    }

    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    pub fn grid(&self) -> &CartesianGrid {
        self.store.grid()
    }

    /// Number of active cells, the length of every compressed array
    pub fn active_size(&self) -> usize {
        self.store.grid().num_active()
    }

    /// True if a `T` property for `name` exists; false for unknown names
    pub fn has<T: StoredValue>(&self, name: &str) -> bool {
        self.store.supports::<T>(name) && self.store.contains::<T>(name)
    }

    /// Names of the `T` properties present, sorted
    pub fn keys<T: StoredValue>(&self) -> Vec<&str> {
        T::registry(&self.store).keywords()
    }

    /// Active-cell values of `name`
    ///
    /// # Errors
    /// Returns `Lookup` if `name` is not a supported `T` keyword
    pub fn get<T: StoredValue>(&mut self, name: &str) -> Result<Vec<T>> {
        self.lookup::<T>(name)?;
        let prop = self.store.deck_property::<T>(name)?;
        prop.compressed_copy(self.store.grid())
    }

    /// Values of `name` for every cartesian cell
    ///
    /// # Errors
    /// Returns `Lookup` if `name` is not a supported `T` keyword
    pub fn get_global<T: StoredValue>(&mut self, name: &str) -> Result<Vec<T>> {
        self.lookup::<T>(name).map(|prop| prop.data().to_vec())
    }

    /// Per-cell defaulted flags of `name`, by global index
    ///
    /// # Errors
    /// Returns `Lookup` if `name` is not a supported `T` keyword
    pub fn defaulted<T: StoredValue>(&mut self, name: &str) -> Result<Vec<bool>> {
        self.lookup::<T>(name).map(|prop| prop.was_defaulted().to_vec())
    }

    /// Make sure a property for `name` exists
    ///
    /// # Errors
    /// Returns `Lookup` if `name` is not a supported `T` keyword
    pub fn assert<T: StoredValue>(&mut self, name: &str) -> Result<()> {
        self.lookup::<T>(name).map(|_| ())
    }

    fn lookup<T: StoredValue>(&mut self, name: &str) -> Result<&GridProperty<T>> {
        if !self.store.supports::<T>(name) {
            return Err(FieldPropsError::lookup(format!(
                "no {} property named {name}",
                T::TYPE_NAME
            )));
        }
        self.store.property::<T>(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{DeckItem, DeckKeyword};

    fn field_props() -> FieldProps {
        let deck = Deck::new(vec![
            DeckKeyword::data("DIMENS", vec![DeckItem::Int(3), DeckItem::Int(1), DeckItem::Int(1)]),
            DeckKeyword::data("ACTNUM", vec![DeckItem::Int(1), DeckItem::Int(0), DeckItem::Int(1)]),
            DeckKeyword::data("PORO", vec![DeckItem::Double(0.1), DeckItem::Double(0.2), DeckItem::Double(0.3)]),
        ]);
        FieldProps::from_deck(&deck, FieldPropsConfig::default()).unwrap()
    }

    #[test]
    fn test_has_never_fails() {
        let fp = field_props();

        assert!(fp.has::<f64>("PORO"));
        assert!(!fp.has::<f64>("NTG"));
        assert!(!fp.has::<i32>("PORO"));
        assert!(!fp.has::<f64>("NONONO"));
        assert_eq!(fp.keys::<f64>(), vec!["PORO"]);
    }

    #[test]
    fn test_get_compressed_and_global() {
        let mut fp = field_props();

        assert_eq!(fp.active_size(), 2);
        assert_eq!(fp.get::<f64>("PORO").unwrap(), vec![0.1, 0.3]);
        assert_eq!(fp.get_global::<f64>("PORO").unwrap(), vec![0.1, 0.2, 0.3]);
        assert_eq!(fp.defaulted::<f64>("PORO").unwrap(), vec![false; 3]);
    }

    #[test]
    fn test_unknown_is_lookup_error() {
        let mut fp = field_props();

        assert!(matches!(fp.get::<f64>("NONONO"), Err(FieldPropsError::Lookup(_))));
        assert!(matches!(fp.get::<i32>("PORO"), Err(FieldPropsError::Lookup(_))));

        // Supported but absent: materialized with defaults
        assert_eq!(fp.get::<i32>("FIPNUM").unwrap(), vec![1, 1]);
        assert!(fp.has::<i32>("FIPNUM"));
    }
}
