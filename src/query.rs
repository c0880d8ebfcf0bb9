//! GQL query construction for schema searches.

use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::core::models::RunQueryRequest;
use crate::schema::Schema;

/// Options consumed by `search` and [`create_schema_query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Single field to group by; ignored unless declared on the record.
    pub group_by: Option<String>,
    /// Single field to order by; ignored unless declared on the record.
    pub order_by: Option<String>,
    /// Expiry for a cached result; the client default applies when unset.
    pub cache_ttl: Option<Duration>,
}

impl QueryOptions {
    #[must_use]
    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by = Some(field.into());
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Read `groupBy`, `orderBy` and `cacheTtl` (seconds) from loosely typed
    /// options. Values of the wrong JSON type are ignored.
    #[must_use]
    pub fn from_json(options: &Value) -> Self {
        let string_option = |name: &str| {
            options
                .get(name)
                .and_then(Value::as_str)
                .map(std::string::ToString::to_string)
        };

        Self {
            group_by: string_option("groupBy"),
            order_by: string_option("orderBy"),
            cache_ttl: options
                .get("cacheTtl")
                .and_then(Value::as_u64)
                .map(Duration::from_secs),
        }
    }
}

/// `SELECT * FROM <kind> [WHERE ..] [GROUP BY <f>] [ORDER BY <f>]`
#[must_use]
pub fn build_query_string<S: Schema>(record: &S, options: &QueryOptions) -> String {
    let mut query = format!("SELECT * FROM {}", record.kind());

    let filters = record.generate_filtered_query().join(" AND ");
    if !filters.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&filters);
    }

    if let Some(field) = options.group_by.as_deref()
        && record.field_exists(field, false)
    {
        query.push_str(" GROUP BY ");
        query.push_str(field);
    }

    if let Some(field) = options.order_by.as_deref()
        && record.field_exists(field, false)
    {
        query.push_str(" ORDER BY ");
        query.push_str(field);
    }

    query
}

#[must_use]
pub fn create_schema_query<S: Schema>(record: &S, options: &QueryOptions) -> RunQueryRequest {
    let query = build_query_string(record, options);
    debug!(kind = record.kind(), query = %query, "Built schema query");
    RunQueryRequest::gql(query)
}
