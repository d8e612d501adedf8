//! Keyword tables and processing switches
//!
//! [`FieldPropsConfig`] decides which keywords the integer and double
//! registries can materialize, with their default fill, dimension and limits.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::deck::Measure;
use crate::error::{FieldPropsError, Result};
use crate::property::SupportedKeywordInfo;
use crate::tables::EndpointKeyword;

/// Region arrays; all default to region 1 and may be modified before set
const REGION_KEYWORDS: [&str; 10] = [
    "SATNUM", "IMBNUM", "PVTNUM", "EQLNUM", "FIPNUM", "MULTNUM", "FLUXNUM", "OPERNUM", "ROCKNUM",
    "ENDNUM",
];

/// Configuration for building a property store from a deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldPropsConfig {
    /// Check configured value limits after the deck is processed
    pub check_limits: bool,

    /// Warn about double properties that still hold NaN after processing
    pub warn_on_nan: bool,

    /// Derive missing saturation end-points from SWOF / SGOF
    pub derive_endpoints: bool,

    /// Keywords of the integer registry
    #[serde(skip, default = "default_int_keywords")]
    pub int_keywords: Vec<SupportedKeywordInfo<i32>>,

    /// Keywords of the double registry
    #[serde(skip, default = "default_double_keywords")]
    pub double_keywords: Vec<SupportedKeywordInfo<f64>>,
}

impl Default for FieldPropsConfig {
    fn default() -> Self {
        Self {
            check_limits: true,
            warn_on_nan: true,
            derive_endpoints: true,
            int_keywords: default_int_keywords(),
            double_keywords: default_double_keywords(),
        }
    }
}

impl FieldPropsConfig {
    /// Check that every dimension string is known and no keyword is listed
    /// twice across both tables
    ///
    /// # Errors
    /// Returns `InvalidArgument` naming the first bad keyword
    pub fn validate(&self) -> Result<()> {
        let mut seen = FxHashSet::default();
        let int_dims = self.int_keywords.iter().map(|i| (i.name(), i.dimension()));
        let double_dims = self.double_keywords.iter().map(|i| (i.name(), i.dimension()));

        for (name, dimension) in int_dims.chain(double_dims) {
            if !seen.insert(name) {
                return Err(FieldPropsError::invalid_argument(format!(
                    "keyword {name} is configured more than once"
                )));
            }
            Measure::from_dimension(dimension).map_err(|e| {
                FieldPropsError::invalid_argument(format!("keyword {name}: {e}"))
            })?;
        }
        Ok(())
    }

    /// True if either table knows `name`
    pub fn is_supported(&self, name: &str) -> bool {
        self.int_keywords.iter().any(|i| i.name() == name)
            || self.double_keywords.iter().any(|i| i.name() == name)
    }
}

/// Integer keywords: region arrays and ACTNUM
pub fn default_int_keywords() -> Vec<SupportedKeywordInfo<i32>> {
    REGION_KEYWORDS
        .iter()
        .map(|&name| SupportedKeywordInfo::new(name, 1, "1").with_default_initializable(true))
        .chain(std::iter::once(
            SupportedKeywordInfo::new("ACTNUM", 1, "1")
                .with_default_initializable(true)
                .with_limits(0, 1),
        ))
        .collect()
}

/// Double keywords: rock properties, geometry, multipliers and end-points
pub fn default_double_keywords() -> Vec<SupportedKeywordInfo<f64>> {
    let mut keywords = vec![
        SupportedKeywordInfo::new("PORO", f64::NAN, "1").with_limits(0.0, 1.0),
        SupportedKeywordInfo::new("PERMX", f64::NAN, "Permeability"),
        SupportedKeywordInfo::new("PERMY", f64::NAN, "Permeability"),
        SupportedKeywordInfo::new("PERMZ", f64::NAN, "Permeability"),
        SupportedKeywordInfo::new("NTG", 1.0, "1")
            .with_default_initializable(true)
            .with_limits(0.0, 1.0),
        SupportedKeywordInfo::new("DX", f64::NAN, "Length"),
        SupportedKeywordInfo::new("DY", f64::NAN, "Length"),
        SupportedKeywordInfo::new("DZ", f64::NAN, "Length"),
    ];

    keywords.extend(["MULTX", "MULTY", "MULTZ", "MULTPV"].iter().map(|&name| {
        SupportedKeywordInfo::new(name, 1.0, "1").with_default_initializable(true)
    }));

    keywords.extend(EndpointKeyword::all_names().into_iter().map(|name| {
        SupportedKeywordInfo::new(name, f64::NAN, "1").with_default_initializable(true)
    }));

    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FieldPropsConfig::default();
        config.validate().unwrap();

        assert!(config.is_supported("SATNUM"));
        assert!(config.is_supported("ISOGCR"));
        assert!(!config.is_supported("NONONO"));
        assert_eq!(config.int_keywords.len(), 11);
        assert_eq!(config.double_keywords.len(), 12 + 16);
    }

    #[test]
    fn test_validate_rejects_duplicates_and_dimensions() {
        let mut config = FieldPropsConfig::default();
        config
            .double_keywords
            .push(SupportedKeywordInfo::new("SATNUM", 1.0, "1"));
        assert!(config.validate().is_err());

        let mut config = FieldPropsConfig::default();
        config
            .double_keywords
            .push(SupportedKeywordInfo::new("DEPTH", 0.0, "Furlong"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_switches_from_json() {
        let config: FieldPropsConfig = serde_json::from_str(r#"{"check_limits": false}"#).unwrap();

        assert!(!config.check_limits);
        assert!(config.warn_on_nan);
        assert_eq!(config.int_keywords, default_int_keywords());
    }
}
