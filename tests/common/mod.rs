#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use datastore_mapper::core::models::{
    CommitRequest, CommitResponse, Entity, EntityResult, QueryResultBatch, RunQueryRequest,
    RunQueryResponse,
};
use datastore_mapper::{
    DatastoreApi, DatastoreError, FieldDescriptor, FieldType, FieldValue, RecordId,
    RequestOptions, Schema,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub static ARTICLE_FIELDS: [FieldDescriptor; 6] = [
    FieldDescriptor::new("title", FieldType::String, true),
    FieldDescriptor::new("views", FieldType::Int, true),
    FieldDescriptor::new("rating", FieldType::Float, true),
    FieldDescriptor::new("published", FieldType::Boolean, true),
    FieldDescriptor::new("created", FieldType::DateTime, true),
    FieldDescriptor::new("summary", FieldType::String, false),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: RecordId,
    pub title: Option<String>,
    pub views: Option<i64>,
    pub rating: Option<f64>,
    pub published: Option<bool>,
    pub created: Option<DateTime<Utc>>,
    pub summary: Option<String>,
}

impl Article {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            views: None,
            rating: None,
            published: None,
            created: None,
            summary: None,
        }
    }
}

impl Schema for Article {
    fn kind(&self) -> &str {
        "Article"
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn with_id(&self, id: RecordId) -> Self {
        Article::new(id)
    }

    fn fields(&self) -> &[FieldDescriptor] {
        &ARTICLE_FIELDS
    }

    fn get(&self, field: &str) -> FieldValue {
        match field {
            "title" => self.title.clone().into(),
            "views" => self.views.into(),
            "rating" => self.rating.into(),
            "published" => self.published.into(),
            "created" => self.created.into(),
            "summary" => self.summary.clone().into(),
            _ => FieldValue::Null,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), DatastoreError> {
        match field {
            "title" => self.title = value.into_string(field)?,
            "views" => self.views = value.into_int(field)?,
            "rating" => self.rating = value.into_float(field)?,
            "published" => self.published = value.into_bool(field)?,
            "created" => self.created = value.into_datetime(field)?,
            "summary" => self.summary = value.into_string(field)?,
            _ => return Err(DatastoreError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

/// A record with nothing but its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Empty {
    pub id: RecordId,
}

impl Schema for Empty {
    fn kind(&self) -> &str {
        "Empty"
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn with_id(&self, id: RecordId) -> Self {
        Empty { id }
    }

    fn fields(&self) -> &[FieldDescriptor] {
        &[]
    }

    fn get(&self, _field: &str) -> FieldValue {
        FieldValue::Null
    }

    fn set(&mut self, field: &str, _value: FieldValue) -> Result<(), DatastoreError> {
        Err(DatastoreError::UnknownField(field.to_string()))
    }
}

/// Stand-in for the remote store that counts calls and records requests.
#[derive(Default)]
pub struct SpyApi {
    pub index_updates: i64,
    pub entities: Vec<Entity>,
    /// When set, every call fails with an `ApiError` of this status.
    pub fail_with: Mutex<Option<u16>>,
    pub commits: AtomicUsize,
    pub queries: AtomicUsize,
    pub datasets: Mutex<Vec<String>>,
    pub last_commit: Mutex<Option<CommitRequest>>,
    pub last_query: Mutex<Option<RunQueryRequest>>,
}

impl SpyApi {
    pub fn returning(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            ..Self::default()
        }
    }

    pub fn with_index_updates(index_updates: i64) -> Self {
        Self {
            index_updates,
            ..Self::default()
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with: Mutex::new(Some(status)),
            ..Self::default()
        }
    }

    pub fn recover(&self) {
        *self.fail_with.lock().unwrap() = None;
    }

    fn failure(&self) -> Result<(), DatastoreError> {
        match *self.fail_with.lock().unwrap() {
            Some(status) => Err(DatastoreError::ApiError {
                status,
                message: "backend unavailable".to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatastoreApi for SpyApi {
    async fn commit(
        &self,
        dataset: &str,
        request: &CommitRequest,
        _options: &RequestOptions,
    ) -> Result<CommitResponse, DatastoreError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.datasets.lock().unwrap().push(dataset.to_string());
        *self.last_commit.lock().unwrap() = Some(request.clone());
        self.failure()?;
        Ok(CommitResponse {
            mutation_results: Vec::new(),
            index_updates: self.index_updates,
        })
    }

    async fn run_query(
        &self,
        dataset: &str,
        request: &RunQueryRequest,
        _options: &RequestOptions,
    ) -> Result<RunQueryResponse, DatastoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.datasets.lock().unwrap().push(dataset.to_string());
        *self.last_query.lock().unwrap() = Some(request.clone());
        self.failure()?;
        Ok(RunQueryResponse {
            batch: QueryResultBatch {
                entity_results: self
                    .entities
                    .iter()
                    .cloned()
                    .map(|entity| EntityResult { entity })
                    .collect(),
                more_results: Some("NO_MORE_RESULTS".to_string()),
            },
        })
    }
}
