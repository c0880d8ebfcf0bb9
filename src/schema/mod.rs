//! Schema base: explicit field declarations and the mapping between typed
//! records and store entities.
//!
//! A record type implements [`Schema`] by naming its kind, listing its fields
//! as [`FieldDescriptor`]s and exposing `get`/`set` for them. Everything else
//! (property mapping, filters, hashing, hydration, export) is provided.

mod dynamic;
mod field;
pub mod filters;
pub mod hash;
pub mod mapping;
mod record;
mod value;

pub use dynamic::DynamicRecord;
pub use field::{FieldDescriptor, FieldType, RESERVED_FIELDS, is_reserved};
pub use filters::Comparison;
pub use record::{RecordId, Schema};
pub use value::FieldValue;
