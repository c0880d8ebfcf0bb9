//! GQL filter terms generated from a record's indexed, non-null fields.
//!
//! Values are inlined as literals; string values are not escaped.

use std::fmt;
use tracing::warn;

use super::field::{FieldDescriptor, FieldType};
use super::record::Schema;
use super::value::{FieldValue, format_date};
use crate::errors::DatastoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparison {
    #[default]
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparison::Eq => "=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        })
    }
}

/// One filter term for `value` under the field's type tag. `operator` only
/// applies to numeric fields.
///
/// # Errors
///
/// Returns `FieldConversion` when the value does not fit the declared type.
pub fn map_filter(
    descriptor: &FieldDescriptor,
    value: FieldValue,
    operator: Comparison,
) -> Result<String, DatastoreError> {
    let field = descriptor.name();
    let value = value.coerce(field, descriptor.field_type)?;

    let filter = match (descriptor.field_type, value) {
        (_, FieldValue::Null) => {
            return Err(DatastoreError::conversion(
                field,
                descriptor.field_type,
                "null values produce no filter",
            ));
        }
        (FieldType::Float, FieldValue::Float(f)) if !f.is_finite() => {
            return Err(DatastoreError::conversion(
                field,
                descriptor.field_type,
                format!("{f} has no query literal"),
            ));
        }
        // Debug keeps the decimal point on whole numbers: 4.0, not 4.
        (FieldType::Float, FieldValue::Float(f)) => format!("{field} {operator} {f:?}"),
        (FieldType::Int | FieldType::Float, v) => format!("{field} {operator} {v}"),
        (FieldType::Boolean, FieldValue::Boolean(b)) => format!("{field} = {b}"),
        (FieldType::DateTime, FieldValue::DateTime(dt)) => {
            format!("{field} contains '{}'", format_date(&dt))
        }
        (_, v) => format!("{field} contains '{v}'"),
    };

    Ok(filter)
}

/// Filters for every indexed, non-reserved, non-null field, in declaration
/// order. A field whose value cannot be converted is skipped.
pub fn generate_filtered_query<S: Schema>(record: &S) -> Vec<String> {
    let mut filters = Vec::new();
    for descriptor in record.fields() {
        if descriptor.is_reserved() || !descriptor.indexed {
            continue;
        }
        let value = record.get(descriptor.name());
        if value.is_null() {
            continue;
        }
        match map_filter(descriptor, value, Comparison::Eq) {
            Ok(filter) => filters.push(filter),
            Err(e) => {
                warn!(kind = record.kind(), field = descriptor.name(), "Skipping filter: {}", e);
            }
        }
    }
    filters
}
