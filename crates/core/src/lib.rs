//! Field Property Core Library
//!
//! Turns the grid-property keywords of a reservoir input deck into typed
//! per-cell arrays. Properties are stored by global cartesian index with a
//! defaulted flag per cell; active-cell views are derived from the grid.
//!
//! ## Layers
//!
//! - [`deck`]: tokenized deck model and unit systems
//! - [`grid`]: cartesian grid with ACTNUM and index boxes
//! - [`property`]: `GridProperty<T>` and the keyword registry
//! - [`tables`]: SWOF / SGOF tables and saturation end-points
//! - [`props`]: deck processing and the two query facades

pub mod config;
pub mod deck;
pub mod error;
pub mod grid;
pub mod property;
pub mod props;
pub mod tables;

pub use config::FieldPropsConfig;
pub use deck::{Deck, DeckItem, DeckKeyword, DeckRecord, KeywordLocation, Measure, UnitSystem};
pub use error::{FieldPropsError, Result};
pub use grid::{CartesianGrid, GridBox};
pub use property::{GridProperties, GridProperty, PropertyValue, SupportedKeywordInfo};
pub use props::{FieldProps, LegacyProperties, PropertyStore, StoredValue};
pub use tables::{EndpointKeyword, EndpointKind, SatFuncTable, TableManager};
