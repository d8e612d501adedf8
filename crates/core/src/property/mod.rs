//! Typed per-cell properties and their keyword registries

pub mod grid_property;
pub mod registry;
pub mod value;

pub use grid_property::*;
pub use registry::*;
pub use value::*;
