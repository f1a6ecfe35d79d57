//! Filter data model: field schema, per-field values and filter snapshots.

mod filter_value;
mod schema;
mod value;

pub use filter_value::FilterValue;
pub use filter_value::PartialFilter;
pub use schema::FieldDescriptor;
pub use schema::FieldKind;
pub use schema::FieldOption;
pub use schema::FieldSchema;
pub use value::Value;
