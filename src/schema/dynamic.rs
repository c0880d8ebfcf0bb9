use std::collections::HashMap;

use super::field::FieldDescriptor;
use super::record::{RecordId, Schema};
use super::value::FieldValue;
use crate::errors::DatastoreError;

/// A record whose fields are declared at runtime.
///
/// Values are stored as given, without coercion, so a value that does not
/// match its declared type only surfaces when the record is mapped.
#[derive(Debug, Clone)]
pub struct DynamicRecord {
    kind: String,
    class_name: String,
    id: RecordId,
    fields: Vec<FieldDescriptor>,
    values: HashMap<String, FieldValue>,
}

impl DynamicRecord {
    #[must_use]
    pub fn new(kind: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        let kind = kind.into();
        Self {
            class_name: kind.clone(),
            kind,
            id: RecordId::generate(),
            fields: fields.into_iter().filter(|d| !d.is_reserved()).collect(),
            values: HashMap::new(),
        }
    }

    /// Declare fields from `{field}_{type}_{indexing}` member names.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMember` for the first malformed name.
    pub fn from_members(kind: impl Into<String>, members: &[&str]) -> Result<Self, DatastoreError> {
        let fields = members
            .iter()
            .map(|m| FieldDescriptor::parse_member(m))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(kind, fields))
    }

    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    #[must_use]
    pub fn with_record_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder-style `set`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` if `field` is not declared.
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Result<Self, DatastoreError> {
        self.set(field, value.into())?;
        Ok(self)
    }
}

impl Schema for DynamicRecord {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn with_id(&self, id: RecordId) -> Self {
        Self {
            kind: self.kind.clone(),
            class_name: self.class_name.clone(),
            id,
            fields: self.fields.clone(),
            values: HashMap::new(),
        }
    }

    fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    fn get(&self, field: &str) -> FieldValue {
        self.values.get(field).cloned().unwrap_or_default()
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), DatastoreError> {
        if !self.fields.iter().any(|d| d.name() == field) {
            return Err(DatastoreError::UnknownField(field.to_string()));
        }
        self.values.insert(field.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_members_are_dropped() {
        let record = DynamicRecord::from_members(
            "Article",
            &["id_int_index", "title_string_index", "loaded_boolean_noindex"],
        )
        .unwrap();

        let names: Vec<&str> = record.fields().iter().map(FieldDescriptor::name).collect();
        assert_eq!(names, vec!["title"]);
    }

    #[test]
    fn test_set_rejects_undeclared_field() {
        let mut record = DynamicRecord::from_members("Article", &["title_string_index"]).unwrap();
        let err = record.set("body", "x".into()).unwrap_err();
        assert!(matches!(err, DatastoreError::UnknownField(name) if name == "body"));
    }

    #[test]
    fn test_with_id_starts_empty() {
        let record = DynamicRecord::from_members("Article", &["title_string_index"])
            .unwrap()
            .with("title", "hello")
            .unwrap();
        let fresh = record.with_id(RecordId::from(3));

        assert_eq!(fresh.id().as_str(), "3");
        assert!(fresh.get("title").is_null());
        assert_eq!(fresh.kind(), "Article");
    }
}
