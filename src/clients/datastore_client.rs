//! Store client: save, search and raw queries against one dataset.
//!
//! The client is a plain value held by the caller; several differently
//! configured clients can coexist in one process.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::http_api::{DatastoreApi, HttpDatastoreApi, RequestOptions};
use crate::cache::{MemoryCache, ResultCache};
use crate::core::config::{DEFAULT_CACHE_TTL, DatastoreConfig};
use crate::core::models::{Entity, RunQueryRequest, RunQueryResponse};
use crate::errors::DatastoreError;
use crate::query::{QueryOptions, create_schema_query};
use crate::schema::Schema;

pub struct DatastoreClient {
    api: Arc<dyn DatastoreApi>,
    cache: Arc<dyn ResultCache>,
    dataset: Option<String>,
    cache_ttl: Duration,
}

impl DatastoreClient {
    /// Connect to the store with service-account credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` for an unusable key and `HttpError` if the HTTP
    /// client cannot be built.
    pub fn configure(config: &DatastoreConfig) -> Result<Self, DatastoreError> {
        let api = HttpDatastoreApi::new(config)?;
        info!(
            application_id = %config.application_id,
            dataset = config.dataset.as_deref().unwrap_or(""),
            "Datastore client configured"
        );

        let mut client = Self::with_backend(Arc::new(api), Arc::new(MemoryCache::default()));
        client.dataset.clone_from(&config.dataset);
        client.cache_ttl = config.cache_ttl;
        Ok(client)
    }

    /// Build a client over any store and cache implementation.
    #[must_use]
    pub fn with_backend(api: Arc<dyn DatastoreApi>, cache: Arc<dyn ResultCache>) -> Self {
        Self {
            api,
            cache,
            dataset: None,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn set_dataset(&mut self, dataset: impl Into<String>) {
        self.dataset = Some(dataset.into());
    }

    #[must_use]
    pub fn dataset(&self) -> Option<&str> {
        self.dataset.as_deref()
    }

    fn check_config(&self) -> Result<&str, DatastoreError> {
        self.dataset.as_deref().ok_or_else(|| {
            error!("Misconfigured dataset, parameter dataset is required");
            DatastoreError::MisconfiguredDataset
        })
    }

    /// Upsert `record`. True when the commit reported index updates.
    ///
    /// # Errors
    ///
    /// Returns `MisconfiguredDataset` without a dataset; store errors
    /// propagate unchanged.
    pub async fn save<S: Schema>(
        &self,
        record: &S,
        options: &RequestOptions,
    ) -> Result<bool, DatastoreError> {
        let dataset = self.check_config()?;
        let request = record.create_request_message();
        let response = self.api.commit(dataset, &request, options).await?;
        debug!(
            kind = record.kind(),
            id = %record.id(),
            index_updates = response.index_updates,
            "Saved record"
        );
        Ok(response.index_updates > 0)
    }

    /// Records matching `template`'s indexed, non-null fields.
    ///
    /// With `use_cache`, a result cached for the same dataset, template hash
    /// and effective grouping/ordering is returned without querying the
    /// store, and a non-empty fresh result is cached.
    ///
    /// # Errors
    ///
    /// Returns `MisconfiguredDataset` without a dataset; store errors
    /// propagate unchanged.
    pub async fn search<S: Schema>(
        &self,
        template: &S,
        options: &QueryOptions,
        use_cache: bool,
    ) -> Result<Vec<S>, DatastoreError> {
        let dataset = self.check_config()?;
        let key = cache_key(dataset, template, options);

        if use_cache && let Some(cached) = self.cached_results(template, &key).await {
            return Ok(cached);
        }

        let request = create_schema_query(template, options);
        let response = self
            .api
            .run_query(dataset, &request, &RequestOptions::default())
            .await?;
        let mapped = map_schema_list(&response, template);

        if use_cache && !mapped.is_empty() {
            let entities: Vec<Entity> = mapped.iter().map(Schema::to_entity).collect();
            match serde_json::to_string(&entities) {
                Ok(payload) => {
                    let ttl = options.cache_ttl.unwrap_or(self.cache_ttl);
                    self.cache.add(&key, payload, ttl).await;
                }
                Err(e) => warn!(kind = template.kind(), "Failed to cache search result: {}", e),
            }
        }

        Ok(mapped)
    }

    async fn cached_results<S: Schema>(&self, template: &S, key: &str) -> Option<Vec<S>> {
        let payload = self.cache.get(key).await?;
        match serde_json::from_str::<Vec<Entity>>(&payload) {
            Ok(entities) if !entities.is_empty() => {
                debug!(kind = template.kind(), key, "Search served from cache");
                Some(
                    entities
                        .iter()
                        .map(|e| template.hydrate_from_entity(e))
                        .collect(),
                )
            }
            Ok(_) => None,
            Err(e) => {
                warn!(kind = template.kind(), key, "Ignoring unreadable cache entry: {}", e);
                None
            }
        }
    }

    /// Run an arbitrary query against the configured dataset.
    ///
    /// # Errors
    ///
    /// Returns `MisconfiguredDataset` without a dataset; store errors
    /// propagate unchanged.
    pub async fn run_query(
        &self,
        request: &RunQueryRequest,
        options: &RequestOptions,
    ) -> Result<RunQueryResponse, DatastoreError> {
        let dataset = self.check_config()?;
        self.api.run_query(dataset, request, options).await
    }
}

/// `<dataset>:<hash>:<group by>:<order by>`, counting only declared fields.
fn cache_key<S: Schema>(dataset: &str, template: &S, options: &QueryOptions) -> String {
    let effective = |field: Option<&str>| {
        field
            .filter(|f| template.field_exists(f, false))
            .unwrap_or_default()
            .to_string()
    };
    format!(
        "{dataset}:{}:{}:{}",
        template.generate_hash(),
        effective(options.group_by.as_deref()),
        effective(options.order_by.as_deref()),
    )
}

/// One new record per returned entity, hydrated through `template`.
pub fn map_schema_list<S: Schema>(response: &RunQueryResponse, template: &S) -> Vec<S> {
    response
        .batch
        .entity_results
        .iter()
        .map(|result| template.hydrate_from_entity(&result.entity))
        .collect()
}
