use chrono::Utc;
use std::fmt;

use super::field::FieldDescriptor;
use super::value::FieldValue;
use super::{filters, hash, mapping};
use crate::core::models::{CommitRequest, Entity, Key};
use crate::errors::DatastoreError;

/// Identifier of a stored record. Stored as the text inside `ClassName[...]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    /// Current time in ten-thousandths of a second since the epoch.
    #[must_use]
    pub fn generate() -> Self {
        Self((Utc::now().timestamp_micros() / 100).to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Base for typed records kept in the store.
///
/// Implementors declare their fields once, in a fixed order, through
/// [`Schema::fields`]; that order drives hashing and export. Reserved names
/// (see [`super::RESERVED_FIELDS`]) are ignored if declared.
pub trait Schema: Send + Sync + Sized {
    /// Store kind (table) the record lives in.
    fn kind(&self) -> &str;

    fn id(&self) -> &RecordId;

    /// A fresh, empty record of the same variant carrying `id`.
    fn with_id(&self, id: RecordId) -> Self;

    fn fields(&self) -> &[FieldDescriptor];

    /// Current value of a declared field; `Null` for unknown names.
    fn get(&self, field: &str) -> FieldValue;

    /// # Errors
    ///
    /// Returns `FieldConversion` when `value` does not fit the field, or
    /// `UnknownField` when the record declares no such field.
    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), DatastoreError>;

    /// Name used in the entity key path, `ClassName[id]`.
    fn class_name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    fn entity_key(&self) -> Key {
        Key::named(self.kind(), format!("{}[{}]", self.class_name(), self.id()))
    }

    fn to_entity(&self) -> Entity {
        Entity {
            key: Some(self.entity_key()),
            properties: mapping::to_properties(self),
        }
    }

    /// Single-entity non-transactional upsert of this record.
    fn create_request_message(&self) -> CommitRequest {
        CommitRequest::upsert(self.to_entity())
    }

    fn generate_filtered_query(&self) -> Vec<String> {
        filters::generate_filtered_query(self)
    }

    /// Cache key over kind, field shape and current values.
    fn generate_hash(&self) -> String {
        hash::generate_hash(self)
    }

    /// Build a new record from a stored entity, using `self` as the template.
    fn hydrate_from_entity(&self, entity: &Entity) -> Self {
        mapping::hydrate_from_entity(self, entity)
    }

    fn export(&self) -> serde_json::Map<String, serde_json::Value> {
        mapping::export(self)
    }

    /// # Errors
    ///
    /// Returns `SerializationError` if the exported map cannot be encoded.
    fn export_json(&self) -> Result<String, DatastoreError> {
        Ok(serde_json::to_string(&self.export())?)
    }

    /// True when a non-reserved field named `name` is declared; with
    /// `check_filter`, its value must also be non-empty.
    fn field_exists(&self, name: &str, check_filter: bool) -> bool {
        self.fields()
            .iter()
            .filter(|d| !d.is_reserved())
            .find(|d| d.name() == name)
            .is_some_and(|d| !check_filter || !self.get(d.name()).is_empty())
    }
}
