//! Wire models for the store's JSON REST surface.
//!
//! Only the subset used by commits and GQL queries is modelled; unknown
//! fields in responses are ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathElement {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Numeric ids travel as decimal strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_id: Option<PartitionId>,
    #[serde(default)]
    pub path: Vec<PathElement>,
}

impl Key {
    #[must_use]
    pub fn named(kind: &str, name: String) -> Self {
        Self {
            partition_id: None,
            path: vec![PathElement {
                kind: kind.to_string(),
                name: Some(name),
                id: None,
            }],
        }
    }
}

/// A single property value. Exactly one of the `*_value` members is set;
/// none set is read back as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integer_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_value: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exclude_from_indexes: bool,
}

impl Value {
    #[must_use]
    pub fn null() -> Self {
        Self {
            null_value: Some("NULL_VALUE".to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            string_value: Some(value.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self {
            integer_value: Some(value.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn double(value: f64) -> Self {
        Self {
            double_value: Some(value),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self {
            boolean_value: Some(value),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn timestamp(value: impl Into<String>) -> Self {
        Self {
            timestamp_value: Some(value.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn indexed(mut self, indexed: bool) -> Self {
        self.exclude_from_indexes = !indexed;
        self
    }

    #[must_use]
    pub fn is_indexed(&self) -> bool {
        !self.exclude_from_indexes
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upsert: Option<Entity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitMode {
    Transactional,
    NonTransactional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub mode: CommitMode,
    pub mutations: Vec<Mutation>,
}

impl CommitRequest {
    /// Single-entity, non-transactional upsert.
    #[must_use]
    pub fn upsert(entity: Entity) -> Self {
        Self {
            mode: CommitMode::NonTransactional,
            mutations: vec![Mutation {
                upsert: Some(entity),
            }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult {
    #[serde(default)]
    pub key: Option<Key>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    #[serde(default)]
    pub mutation_results: Vec<MutationResult>,
    #[serde(default)]
    pub index_updates: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlQuery {
    pub query_string: String,
    #[serde(default)]
    pub allow_literals: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_id: Option<PartitionId>,
    pub gql_query: GqlQuery,
}

impl RunQueryRequest {
    /// A literal-allowed GQL request.
    #[must_use]
    pub fn gql(query: impl Into<String>) -> Self {
        Self {
            partition_id: None,
            gql_query: GqlQuery {
                query_string: query.into(),
                allow_literals: true,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityResult {
    pub entity: Entity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResultBatch {
    #[serde(default)]
    pub entity_results: Vec<EntityResult>,
    #[serde(default)]
    pub more_results: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    #[serde(default)]
    pub batch: QueryResultBatch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_commit_request_wire_shape() {
        let mut entity = Entity {
            key: Some(Key::named("Article", "Article[7]".to_string())),
            ..Entity::default()
        };
        entity
            .properties
            .insert("views".to_string(), Value::integer(12).indexed(false));

        let body = serde_json::to_value(CommitRequest::upsert(entity)).unwrap();

        assert_eq!(
            body,
            json!({
                "mode": "NON_TRANSACTIONAL",
                "mutations": [{
                    "upsert": {
                        "key": {"path": [{"kind": "Article", "name": "Article[7]"}]},
                        "properties": {
                            "views": {"integerValue": "12", "excludeFromIndexes": true}
                        }
                    }
                }]
            })
        );
    }

    #[test]
    fn test_run_query_response_parsing() {
        let raw = r#"{
            "batch": {
                "entityResultType": "FULL",
                "entityResults": [
                    {"entity": {"key": {"path": [{"kind": "Article", "name": "Article[1]"}]},
                                "properties": {"title": {"stringValue": "hello"}}}}
                ],
                "moreResults": "NO_MORE_RESULTS"
            }
        }"#;
        let response: RunQueryResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(response.batch.entity_results.len(), 1);
        let entity = &response.batch.entity_results[0].entity;
        assert_eq!(
            entity.properties["title"].string_value.as_deref(),
            Some("hello")
        );
        assert!(entity.properties["title"].is_indexed());
    }

    #[test]
    fn test_commit_response_defaults_index_updates() {
        let response: CommitResponse =
            serde_json::from_str(r#"{"mutationResults": [{"version": "1"}]}"#).unwrap();
        assert_eq!(response.index_updates, 0);
    }
}
