//! Deck keywords, records and items
//!
//! A [`Deck`] is an ordered list of [`DeckKeyword`]s. Each keyword holds
//! records, each record holds items, and every item is either an explicit
//! value or a defaulted placeholder (`1*` in deck syntax).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::units::UnitSystem;

/// Where a keyword was read from, for user-facing diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordLocation {
    /// Keyword name as written in the deck
    pub keyword: String,
    /// Source file
    pub filename: String,
    /// 1-based line number of the keyword header
    pub lineno: usize,
}

impl KeywordLocation {
    /// Create a location record
    pub fn new(keyword: impl Into<String>, filename: impl Into<String>, lineno: usize) -> Self {
        Self {
            keyword: keyword.into(),
            filename: filename.into(),
            lineno,
        }
    }

    /// Location for keywords built in memory rather than read from a file
    pub fn in_memory(keyword: impl Into<String>) -> Self {
        Self::new(keyword, "<memory>", 0)
    }
}

impl fmt::Display for KeywordLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {} line {}", self.keyword, self.filename, self.lineno)
    }
}

/// A single item of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeckItem {
    Int(i32),
    Double(f64),
    Str(String),
    /// Item given as `1*`: the deck asks for whatever the default is
    Defaulted,
}

impl DeckItem {
    /// True if the deck left this item to its default
    #[inline]
    pub fn is_defaulted(&self) -> bool {
        matches!(self, DeckItem::Defaulted)
    }

    /// Integer value, if the item holds one
    pub fn as_int(&self) -> Option<i32> {
        match self {
            DeckItem::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Floating point value; integers widen losslessly
    pub fn as_double(&self) -> Option<f64> {
        match self {
            DeckItem::Double(v) => Some(*v),
            DeckItem::Int(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    /// String value, if the item holds one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DeckItem::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i32> for DeckItem {
    fn from(v: i32) -> Self {
        DeckItem::Int(v)
    }
}

impl From<f64> for DeckItem {
    fn from(v: f64) -> Self {
        DeckItem::Double(v)
    }
}

impl From<&str> for DeckItem {
    fn from(v: &str) -> Self {
        DeckItem::Str(v.to_string())
    }
}

/// Ordered items of one record (one `/`-terminated line group in the deck)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckRecord {
    items: Vec<DeckItem>,
}

impl DeckRecord {
    /// Create a record from its items
    pub fn new(items: Vec<DeckItem>) -> Self {
        Self { items }
    }

    /// Number of items
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the record holds no items
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at position `index`
    pub fn item(&self, index: usize) -> Option<&DeckItem> {
        self.items.get(index)
    }

    /// All items in order
    pub fn items(&self) -> &[DeckItem] {
        &self.items
    }
}

impl FromIterator<DeckItem> for DeckRecord {
    fn from_iter<I: IntoIterator<Item = DeckItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A named deck directive with its records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckKeyword {
    name: String,
    records: Vec<DeckRecord>,
    /// Set for keywords whose single record is a flat per-cell data array
    #[serde(default)]
    data: bool,
    #[serde(default)]
    location: Option<KeywordLocation>,
}

impl DeckKeyword {
    /// Create a keyword with structured records (TABDIMS, EQUALS, ...)
    pub fn new(name: impl Into<String>, records: Vec<DeckRecord>) -> Self {
        Self {
            name: name.into(),
            records,
            data: false,
            location: None,
        }
    }

    /// Create a flat data keyword (PORO, SATNUM, ...) from its items
    pub fn data(name: impl Into<String>, items: Vec<DeckItem>) -> Self {
        Self {
            name: name.into(),
            records: vec![DeckRecord::new(items)],
            data: true,
            location: None,
        }
    }

    /// Create a keyword without records (ENDBOX, METRIC, ...)
    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Attach the source location
    pub fn with_location(mut self, filename: impl Into<String>, lineno: usize) -> Self {
        self.location = Some(KeywordLocation::new(self.name.clone(), filename, lineno));
        self
    }

    /// Keyword name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All records in order
    pub fn records(&self) -> &[DeckRecord] {
        &self.records
    }

    /// Record at position `index`
    pub fn record(&self, index: usize) -> Option<&DeckRecord> {
        self.records.get(index)
    }

    /// True for flat data keywords with exactly one record
    pub fn is_data_keyword(&self) -> bool {
        self.data && self.records.len() == 1
    }

    /// Source location, or an in-memory placeholder
    pub fn location(&self) -> KeywordLocation {
        self.location
            .clone()
            .unwrap_or_else(|| KeywordLocation::in_memory(self.name.clone()))
    }
}

/// Ordered sequence of keywords making up one simulation case
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    keywords: Vec<DeckKeyword>,
}

impl Deck {
    /// Create a deck from keywords in deck order
    pub fn new(keywords: Vec<DeckKeyword>) -> Self {
        Self { keywords }
    }

    /// Append a keyword
    pub fn push(&mut self, keyword: DeckKeyword) {
        self.keywords.push(keyword);
    }

    /// Keywords in deck order
    pub fn keywords(&self) -> &[DeckKeyword] {
        &self.keywords
    }

    /// Last occurrence of keyword `name`
    pub fn last_keyword(&self, name: &str) -> Option<&DeckKeyword> {
        self.keywords.iter().rev().find(|kw| kw.name == name)
    }

    /// Unit system selected by the deck; the last of METRIC/FIELD/LAB wins
    pub fn unit_system(&self) -> UnitSystem {
        self.keywords
            .iter()
            .rev()
            .find_map(|kw| UnitSystem::from_keyword(&kw.name))
            .unwrap_or_default()
    }
}

impl FromIterator<DeckKeyword> for Deck {
    fn from_iter<I: IntoIterator<Item = DeckKeyword>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
