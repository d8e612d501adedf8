//! Query surface with the legacy keyword policy
//!
//! Asking whether a keyword was given is a logic error when the keyword is
//! not in the element type's table at all.

use super::store::{PropertyStore, StoredValue};
use crate::config::FieldPropsConfig;
use crate::deck::Deck;
use crate::error::{FieldPropsError, Result};
use crate::grid::CartesianGrid;
use crate::property::GridProperty;

/// Legacy view of the properties of one case
#[derive(Debug, Clone)]
pub struct LegacyProperties {
    store: PropertyStore,
}

impl LegacyProperties {
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

    /// True if `name` is in the `T` keyword table
    pub fn supports_property<T: StoredValue>(&self, name: &str) -> bool {
        self.store.supports::<T>(name)
    }

    /// Whether the deck produced a `T` property for `name`
    ///
    /// # Errors
    /// Returns `Logic` if `name` is not a supported `T` keyword
    pub fn has_deck_property<T: StoredValue>(&self, name: &str) -> Result<bool> {
        if !self.store.supports::<T>(name) {
            return Err(FieldPropsError::logic(format!(
                "{name} is not a supported {} keyword",
                T::TYPE_NAME
            )));
        }
        Ok(self.store.contains::<T>(name))
    }

    /// Property for `name`, materialized with defaults or derived end-points
    /// when the deck did not give it
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `name` is not a supported `T` keyword
    pub fn get<T: StoredValue>(&mut self, name: &str) -> Result<&GridProperty<T>> {
        self.store.property::<T>(name)
    }

    /// Make sure a property for `name` exists
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `name` is not a supported `T` keyword
    pub fn assert<T: StoredValue>(&mut self, name: &str) -> Result<()> {
        self.store.property::<T>(name).map(|_| ())
    }

    /// # Errors
    /// See [`Self::has_deck_property`]
    pub fn has_deck_int_property(&self, name: &str) -> Result<bool> {
        self.has_deck_property::<i32>(name)
    }

    /// # Errors
    /// See [`Self::has_deck_property`]
    pub fn has_deck_double_property(&self, name: &str) -> Result<bool> {
        self.has_deck_property::<f64>(name)
    }

    /// # Errors
    /// See [`Self::get`]
    pub fn get_int_property(&mut self, name: &str) -> Result<&GridProperty<i32>> {
        self.get::<i32>(name)
    }

    /// # Errors
    /// See [`Self::get`]
    pub fn get_double_property(&mut self, name: &str) -> Result<&GridProperty<f64>> {
        self.get::<f64>(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{DeckItem, DeckKeyword};

    fn legacy() -> LegacyProperties {
        let deck = Deck::new(vec![
            DeckKeyword::data("DIMENS", vec![DeckItem::Int(2), DeckItem::Int(1), DeckItem::Int(1)]),
            DeckKeyword::data("SATNUM", vec![DeckItem::Int(1), DeckItem::Int(2)]),
        ]);
        LegacyProperties::from_deck(&deck, FieldPropsConfig::default()).unwrap()
    }

    #[test]
    fn test_has_deck_property_policy() {
        let props = legacy();

        assert!(props.has_deck_int_property("SATNUM").unwrap());
        assert!(!props.has_deck_int_property("FIPNUM").unwrap());
        assert!(matches!(
            props.has_deck_int_property("PORO"),
            Err(FieldPropsError::Logic(_))
        ));
        assert!(matches!(
            props.has_deck_double_property("NONONO"),
            Err(FieldPropsError::Logic(_))
        ));
    }

    #[test]
    fn test_get_materializes() {
        let mut props = legacy();

        assert_eq!(props.get_int_property("FIPNUM").unwrap().data(), &[1, 1]);
        assert!(props.has_deck_int_property("FIPNUM").unwrap());
        assert!(matches!(
            props.get_double_property("SATNUM"),
            Err(FieldPropsError::InvalidArgument(_))
        ));

        props.assert::<f64>("PORO").unwrap();
        assert!(props.has_deck_double_property("PORO").unwrap());
    }
}
