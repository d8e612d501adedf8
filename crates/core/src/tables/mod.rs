pub mod endpoints;
pub mod saturation;

pub use endpoints::*;
pub use saturation::*;
