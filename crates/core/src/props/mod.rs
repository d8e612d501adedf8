pub mod field_props;
pub mod legacy;
pub mod modifiers;
pub mod store;

pub use field_props::FieldProps;
pub use legacy::LegacyProperties;
pub use modifiers::{BoxOperator, RegionArray, RegionOperator};
pub use store::{ElementType, PropertyStore, StoredValue};
