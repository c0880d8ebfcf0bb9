use std::borrow::Cow;
use std::fmt;

use crate::errors::DatastoreError;

/// Names that never take part in property mapping, filters or hashing.
pub const RESERVED_FIELDS: &[&str] = &["id", "loaded", "loadTs", "loadMem"];

const MEMBER_DELIMITER: char = '_';
const INDEX_TAG: &str = "index";
const NO_INDEX_TAG: &str = "noindex";

#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_FIELDS.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Int,
    Float,
    Boolean,
    DateTime,
}

impl FieldType {
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::DateTime => "datetime",
        }
    }

    /// Unknown tags map to `String`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "int" | "integer" => FieldType::Int,
            "float" => FieldType::Float,
            "boolean" | "bool" => FieldType::Boolean,
            "datetime" => FieldType::DateTime,
            _ => FieldType::String,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Declaration of one stored field: its name, type tag and whether it is
/// indexed (and so takes part in generated filters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: Cow<'static, str>,
    pub field_type: FieldType,
    pub indexed: bool,
}

impl FieldDescriptor {
    #[must_use]
    pub const fn new(name: &'static str, field_type: FieldType, indexed: bool) -> Self {
        Self {
            name: Cow::Borrowed(name),
            field_type,
            indexed,
        }
    }

    #[must_use]
    pub fn owned(name: impl Into<String>, field_type: FieldType, indexed: bool) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            field_type,
            indexed,
        }
    }

    /// Parse a `{field}_{type}_{indexing}` member name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMember` unless the name splits into exactly three
    /// non-empty field/type parts.
    pub fn parse_member(member: &str) -> Result<Self, DatastoreError> {
        let parts: Vec<&str> = member.split(MEMBER_DELIMITER).collect();
        let [field, type_tag, index_tag] = parts.as_slice() else {
            return Err(DatastoreError::InvalidMember(format!(
                "{member}: expected field{MEMBER_DELIMITER}type{MEMBER_DELIMITER}indexing"
            )));
        };
        if field.is_empty() || type_tag.is_empty() {
            return Err(DatastoreError::InvalidMember(format!(
                "{member}: empty field or type"
            )));
        }

        Ok(Self::owned(
            *field,
            FieldType::from_tag(type_tag),
            index_tag.eq_ignore_ascii_case(INDEX_TAG),
        ))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn index_tag(&self) -> &'static str {
        if self.indexed { INDEX_TAG } else { NO_INDEX_TAG }
    }

    #[must_use]
    pub fn is_reserved(&self) -> bool {
        is_reserved(&self.name)
    }
}
