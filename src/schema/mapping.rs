//! Conversion between records and store entities.

use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::field::{FieldDescriptor, FieldType};
use super::record::{RecordId, Schema};
use super::value::{FieldValue, format_iso8601, parse_iso8601};
use crate::core::models::{Entity, Value};
use crate::errors::DatastoreError;

/// Map one field to a store property of its declared type.
///
/// # Errors
///
/// Returns `FieldConversion` when the value cannot be coerced.
pub fn map_property(descriptor: &FieldDescriptor, value: FieldValue) -> Result<Value, DatastoreError> {
    let property = match value.coerce(descriptor.name(), descriptor.field_type)? {
        FieldValue::Null => Value::null(),
        FieldValue::String(s) => Value::string(s),
        FieldValue::Int(i) => Value::integer(i),
        FieldValue::Float(f) => Value::double(f),
        FieldValue::Boolean(b) => Value::boolean(b),
        FieldValue::DateTime(dt) => Value::timestamp(format_iso8601(&dt)),
    };

    Ok(property.indexed(descriptor.indexed))
}

/// Properties for every non-reserved field. A field whose value does not fit
/// its type is left out.
pub fn to_properties<S: Schema>(record: &S) -> BTreeMap<String, Value> {
    let mut properties = BTreeMap::new();
    for descriptor in record.fields().iter().filter(|d| !d.is_reserved()) {
        match map_property(descriptor, record.get(descriptor.name())) {
            Ok(property) => {
                properties.insert(descriptor.name().to_string(), property);
            }
            Err(e) => {
                warn!(kind = record.kind(), field = descriptor.name(), "Skipping property: {}", e);
            }
        }
    }
    properties
}

/// Read a stored property back as a field value of the declared type.
///
/// # Errors
///
/// Returns `FieldConversion` for unparsable integers/timestamps or values the
/// declared type cannot hold.
pub fn property_to_field_value(
    descriptor: &FieldDescriptor,
    property: &Value,
) -> Result<FieldValue, DatastoreError> {
    let field = descriptor.name();
    let raw = if let Some(s) = &property.string_value {
        FieldValue::String(s.clone())
    } else if let Some(i) = &property.integer_value {
        i.parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|e| DatastoreError::conversion(field, FieldType::Int, e.to_string()))?
    } else if let Some(f) = property.double_value {
        FieldValue::Float(f)
    } else if let Some(b) = property.boolean_value {
        FieldValue::Boolean(b)
    } else if let Some(ts) = &property.timestamp_value {
        parse_iso8601(ts)
            .map(FieldValue::DateTime)
            .map_err(|e| DatastoreError::conversion(field, FieldType::DateTime, e))?
    } else {
        FieldValue::Null
    };

    raw.coerce(field, descriptor.field_type)
}

/// Recover the raw id from an entity key of the form `ClassName[id]`.
///
/// Falls back to the whole name when it has no brackets, to a numeric key id,
/// and finally to a freshly generated id.
#[must_use]
pub fn resolve_id(entity: &Entity) -> RecordId {
    static COMPOSITE_ID_RE: std::sync::LazyLock<Option<Regex>> =
        std::sync::LazyLock::new(|| Regex::new(r"^(.*)\[(.*)\]$").ok());

    let Some(element) = entity.key.as_ref().and_then(|k| k.path.first()) else {
        return RecordId::generate();
    };

    if let Some(name) = element.name.as_deref() {
        let inner = COMPOSITE_ID_RE
            .as_ref()
            .and_then(|re| re.captures(name))
            .and_then(|caps| caps.get(2))
            .map(|m| m.as_str());
        return RecordId::from(inner.unwrap_or(name));
    }

    element
        .id
        .as_deref()
        .map_or_else(RecordId::generate, RecordId::from)
}

/// New record from `template`'s variant, filled from `entity`. A field that
/// fails to convert is set to null; siblings are unaffected.
pub fn hydrate_from_entity<S: Schema>(template: &S, entity: &Entity) -> S {
    let mut record = template.with_id(resolve_id(entity));

    for descriptor in template.fields().iter().filter(|d| !d.is_reserved()) {
        let Some(property) = entity.properties.get(descriptor.name()) else {
            continue;
        };

        let value = property_to_field_value(descriptor, property).unwrap_or_else(|e| {
            warn!(kind = template.kind(), field = descriptor.name(), "Hydrating as null: {}", e);
            FieldValue::Null
        });

        if let Err(e) = record.set(descriptor.name(), value) {
            warn!(kind = template.kind(), field = descriptor.name(), "Hydrating as null: {}", e);
            if let Err(e) = record.set(descriptor.name(), FieldValue::Null) {
                debug!(field = descriptor.name(), "Field rejected null: {}", e);
            }
        }
    }

    record
}

/// Plain map of every non-reserved field; values that do not fit their type
/// are exported as null.
pub fn export<S: Schema>(record: &S) -> serde_json::Map<String, serde_json::Value> {
    let mut data = serde_json::Map::new();
    for descriptor in record.fields().iter().filter(|d| !d.is_reserved()) {
        let value = record
            .get(descriptor.name())
            .coerce(descriptor.name(), descriptor.field_type)
            .unwrap_or_else(|e| {
                warn!(kind = record.kind(), field = descriptor.name(), "Exporting as null: {}", e);
                FieldValue::Null
            });
        data.insert(descriptor.name().to_string(), value.to_json());
    }
    data
}
