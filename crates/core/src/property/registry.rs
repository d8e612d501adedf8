//! Keyword-indexed collections of grid properties
//!
//! A registry knows a fixed table of supported keywords and materializes a
//! [`GridProperty`] for one of them only when asked to. Existence checks never
//! materialize anything, so "supported" and "present" stay distinguishable.

use rustc_hash::FxHashMap;

use super::{GridProperty, PropertyValue, SupportedKeywordInfo};
use crate::error::{FieldPropsError, Result};
use crate::grid::{CartesianGrid, GridBox};

/// Properties of one element type, indexed by keyword name
#[derive(Debug, Clone)]
pub struct GridProperties<T> {
    nx: usize,
    ny: usize,
    nz: usize,
    supported: FxHashMap<String, SupportedKeywordInfo<T>>,
    properties: FxHashMap<String, GridProperty<T>>,
}

impl<T: PropertyValue> GridProperties<T> {
    /// Create an empty registry for `grid` that can materialize `supported`
    ///
    /// A keyword listed twice keeps its last description.
    pub fn new(grid: &CartesianGrid, supported: Vec<SupportedKeywordInfo<T>>) -> Self {
        Self::with_dims(grid.nx(), grid.ny(), grid.nz(), supported)
    }

    /// As [`Self::new`], from bare dimensions
    pub fn with_dims(
        nx: usize,
        ny: usize,
        nz: usize,
        supported: Vec<SupportedKeywordInfo<T>>,
    ) -> Self {
        let supported = supported
            .into_iter()
            .map(|info| (info.name().to_string(), info))
            .collect();
        Self {
            nx,
            ny,
            nz,
            supported,
            properties: FxHashMap::default(),
        }
    }

    /// True if `name` is in the supported keyword table
    pub fn supports_keyword(&self, name: &str) -> bool {
        self.supported.contains_key(name)
    }

    /// True if a property for `name` has been materialized
    pub fn has_keyword(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Supported keyword description
    pub fn keyword_info(&self, name: &str) -> Option<&SupportedKeywordInfo<T>> {
        self.supported.get(name)
    }

    /// Materialize a default-filled property for `name`
    ///
    /// Returns `true` if the property was created, `false` if it existed.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `name` is not supported
    pub fn add_keyword(&mut self, name: &str) -> Result<bool> {
        if self.properties.contains_key(name) {
            return Ok(false);
        }
        let info = self.supported_info(name)?.clone();
        self.properties
            .insert(name.to_string(), GridProperty::new(self.nx, self.ny, self.nz, info));
        Ok(true)
    }

    /// Property for `name`, materialized with defaults if absent
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `name` is not supported
    pub fn get_keyword(&mut self, name: &str) -> Result<&mut GridProperty<T>> {
        self.add_keyword(name)?;
        self.properties
            .get_mut(name)
            .ok_or_else(|| FieldPropsError::invalid_argument(format!("{name} vanished after add")))
    }

    /// Force `name` to be present
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `name` is not supported
    pub fn assert_keyword(&mut self, name: &str) -> Result<()> {
        self.add_keyword(name).map(|_| ())
    }

    /// Property for `name` only if it has already been materialized
    ///
    /// # Errors
    /// Returns `InvalidArgument` if no property exists, even when `name` is
    /// supported
    pub fn get_deck_keyword(&self, name: &str) -> Result<&GridProperty<T>> {
        self.properties.get(name).ok_or_else(|| {
            FieldPropsError::invalid_argument(format!(
                "{} keyword {name} has not been loaded",
                T::TYPE_NAME
            ))
        })
    }

    /// Property for `name` as an arithmetic operand
    ///
    /// Existing properties are returned as is. Absent ones are materialized
    /// only when their keyword is default-initializable.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `name` is unsupported, or absent and not
    /// default-initializable
    pub fn get_initialized_keyword(&mut self, name: &str) -> Result<&mut GridProperty<T>> {
        if !self.properties.contains_key(name) {
            let info = self.supported_info(name)?;
            if !info.is_default_initializable() {
                return Err(FieldPropsError::invalid_argument(format!(
                    "{name} must be given in the deck before it can be modified"
                )));
            }
        }
        self.get_keyword(name)
    }

    /// Copy the cells of `grid_box` from property `src` into `dst`
    ///
    /// `src` must be initialized as for [`Self::get_initialized_keyword`];
    /// `dst` is materialized if needed.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if either keyword cannot be provided
    pub fn copy_keyword(&mut self, src: &str, dst: &str, grid_box: &GridBox) -> Result<()> {
        self.get_initialized_keyword(src)?;
        if src == dst {
            return Ok(());
        }
        self.assert_keyword(dst)?;

        let mut target = self
            .properties
            .remove(dst)
            .ok_or_else(|| FieldPropsError::invalid_argument(format!("{dst} vanished before copy")))?;
        let result = match self.properties.get(src) {
            Some(source) => target.copy_from(source, grid_box),
            None => Err(FieldPropsError::invalid_argument(format!("{src} vanished before copy"))),
        };
        self.properties.insert(dst.to_string(), target);
        result
    }

    /// Number of materialized properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// True if nothing has been materialized
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Names of materialized properties, sorted
    pub fn keywords(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.properties.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Materialized properties sorted by keyword name
    pub fn iter(&self) -> impl Iterator<Item = &GridProperty<T>> {
        let mut props: Vec<&GridProperty<T>> = self.properties.values().collect();
        props.sort_unstable_by(|a, b| a.keyword_name().cmp(b.keyword_name()));
        props.into_iter()
    }

    fn supported_info(&self, name: &str) -> Result<&SupportedKeywordInfo<T>> {
        self.supported.get(name).ok_or_else(|| {
            FieldPropsError::invalid_argument(format!(
                "{} keyword {name} is not supported",
                T::TYPE_NAME
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_registry(keywords: &[(&str, i32, bool)]) -> GridProperties<i32> {
        let grid = CartesianGrid::new(10, 7, 9);
        let supported = keywords
            .iter()
            .map(|&(name, dflt, init)| {
                SupportedKeywordInfo::new(name, dflt, "1").with_default_initializable(init)
            })
            .collect();
        GridProperties::new(&grid, supported)
    }

    #[test]
    fn test_properties_empty() {
        let props = int_registry(&[("SATNUM", 0, false), ("FIPNUM", 2, false)]);

        assert!(props.supports_keyword("SATNUM"));
        assert!(props.supports_keyword("FIPNUM"));
        assert!(!props.supports_keyword("FLUXNUM"));
        assert!(!props.has_keyword("SATNUM"));
        assert!(!props.has_keyword("FLUXNUM"));
        assert!(props.is_empty());

        assert!(matches!(
            props.get_deck_keyword("SATNUM"),
            Err(FieldPropsError::InvalidArgument(_))
        ));
        assert!(matches!(
            props.get_deck_keyword("NONONO"),
            Err(FieldPropsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_add_keyword() {
        let mut props = int_registry(&[("SATNUM", 0, false)]);

        assert!(matches!(
            props.add_keyword("NOT-SUPPORTED"),
            Err(FieldPropsError::InvalidArgument(_))
        ));
        assert!(props.add_keyword("SATNUM").unwrap());
        assert!(!props.add_keyword("SATNUM").unwrap());
        assert!(props.has_keyword("SATNUM"));
        assert_eq!(props.get_deck_keyword("SATNUM").unwrap().cartesian_size(), 630);
    }

    #[test]
    fn test_has_keyword_assert_keyword() {
        let mut props = int_registry(&[("SATNUM", 0, true), ("FIPNUM", 0, true)]);

        assert!(!props.has_keyword("SATNUM"));
        assert!(!props.has_keyword("FIPNUM"));

        props.assert_keyword("FIPNUM").unwrap();
        props.get_keyword("SATNUM").unwrap();
        assert!(props.has_keyword("SATNUM"));
        assert!(props.has_keyword("FIPNUM"));
        assert_eq!(props.keywords(), vec!["FIPNUM", "SATNUM"]);

        assert!(matches!(
            props.get_keyword("NOT-SUPPORTED"),
            Err(FieldPropsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_initialized_keyword_needs_data_or_initializable() {
        let mut props = int_registry(&[("PVTNUM", 1, true), ("OPERNUM", 0, false)]);

        assert_eq!(props.get_initialized_keyword("PVTNUM").unwrap().data()[0], 1);
        assert!(props.get_initialized_keyword("OPERNUM").is_err());
        assert!(!props.has_keyword("OPERNUM"));

        props.assert_keyword("OPERNUM").unwrap();
        assert!(props.get_initialized_keyword("OPERNUM").is_ok());
    }

    #[test]
    fn test_copy_keyword() {
        let mut props = int_registry(&[("SATNUM", 3, true), ("IMBNUM", 1, false)]);
        let grid = CartesianGrid::new(10, 7, 9);
        let top = GridBox::new(&grid, 0, 9, 0, 6, 0, 0).unwrap();

        props.copy_keyword("SATNUM", "IMBNUM", &top).unwrap();

        let imbnum = props.get_deck_keyword("IMBNUM").unwrap();
        assert!(imbnum.data()[..70].iter().all(|&v| v == 3));
        assert!(imbnum.data()[70..].iter().all(|&v| v == 1));

        // IMBNUM is not default-initializable and FIPNUM is unknown
        props.properties.clear();
        assert!(props.copy_keyword("IMBNUM", "SATNUM", &top).is_err());
        assert!(props.copy_keyword("SATNUM", "FIPNUM", &top).is_err());
    }
}
