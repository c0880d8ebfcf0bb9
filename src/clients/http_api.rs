//! Remote store access over its JSON REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

use super::auth::ServiceAccountAuth;
use crate::core::config::DatastoreConfig;
use crate::core::models::{CommitRequest, CommitResponse, RunQueryRequest, RunQueryResponse};
use crate::errors::DatastoreError;

pub const DEFAULT_ENDPOINT: &str = "https://datastore.googleapis.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Standard request parameters passed through to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Partial response selector.
    pub fields: Option<String>,
    pub quota_user: Option<String>,
}

impl RequestOptions {
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(fields) = &self.fields {
            pairs.push(("fields", fields.clone()));
        }
        if let Some(quota_user) = &self.quota_user {
            pairs.push(("quotaUser", quota_user.clone()));
        }
        pairs
    }
}

/// The remote store operations this crate relies on.
#[async_trait]
pub trait DatastoreApi: Send + Sync {
    async fn commit(
        &self,
        dataset: &str,
        request: &CommitRequest,
        options: &RequestOptions,
    ) -> Result<CommitResponse, DatastoreError>;

    async fn run_query(
        &self,
        dataset: &str,
        request: &RunQueryRequest,
        options: &RequestOptions,
    ) -> Result<RunQueryResponse, DatastoreError>;
}

pub struct HttpDatastoreApi {
    http: Client,
    auth: ServiceAccountAuth,
    endpoint: String,
}

impl HttpDatastoreApi {
    /// # Errors
    ///
    /// Returns `HttpError` if the HTTP client cannot be built and `AuthError`
    /// for an unusable private key.
    pub fn new(config: &DatastoreConfig) -> Result<Self, DatastoreError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(config.application_id.clone())
            .build()
            .map_err(|e| DatastoreError::HttpError(format!("Failed to build HTTP client: {e}")))?;
        let auth = ServiceAccountAuth::new(config, http.clone())?;
        let endpoint = config
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http,
            auth,
            endpoint,
        })
    }

    #[must_use]
    pub fn method_url(&self, dataset: &str, method: &str) -> String {
        format!("{}/projects/{dataset}:{method}", self.endpoint)
    }

    async fn post<B, R>(
        &self,
        dataset: &str,
        method: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<R, DatastoreError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let url = self.method_url(dataset, method);
        let token = self.auth.access_token().await?;

        #[cfg(feature = "debug-logs")]
        debug!(
            "POST {} body: {}",
            url,
            serde_json::to_string(body).unwrap_or_default()
        );

        #[cfg(not(feature = "debug-logs"))]
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .query(&options.query_pairs())
            .json(body)
            .send()
            .await
            .map_err(|e| DatastoreError::HttpError(format!("Datastore {method} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(DatastoreError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<R>().await.map_err(|e| {
            DatastoreError::SerializationError(format!("Failed to parse {method} response: {e}"))
        })
    }
}

#[async_trait]
impl DatastoreApi for HttpDatastoreApi {
    async fn commit(
        &self,
        dataset: &str,
        request: &CommitRequest,
        options: &RequestOptions,
    ) -> Result<CommitResponse, DatastoreError> {
        let response: CommitResponse = self.post(dataset, "commit", request, options).await?;
        info!(
            dataset,
            index_updates = response.index_updates,
            "Commit finished"
        );
        Ok(response)
    }

    async fn run_query(
        &self,
        dataset: &str,
        request: &RunQueryRequest,
        options: &RequestOptions,
    ) -> Result<RunQueryResponse, DatastoreError> {
        let response: RunQueryResponse = self.post(dataset, "runQuery", request, options).await?;
        info!(
            dataset,
            results = response.batch.entity_results.len(),
            "Query finished"
        );
        Ok(response)
    }
}
