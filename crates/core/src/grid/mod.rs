//! Grid topology and box-scoped cell selection

pub mod cartesian;
pub mod grid_box;

// Re-export main types
pub use cartesian::*;
pub use grid_box::*;
