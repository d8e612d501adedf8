//! Tokenized deck model and unit system
//!
//! The engine never reads deck text. It consumes keywords that a lexer has
//! already split into records and items, in deck order.

pub mod keyword;
pub mod units;

pub use keyword::*;
pub use units::*;
