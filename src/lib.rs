/// Datastore Mapper - typed records over a managed cloud document store.
///
/// The crate maps record types onto store entities and back, builds GQL
/// queries from record templates, and caches search results for a short time.
/// Storage, indexing, transactions and the wire protocol stay with the store
/// itself.
///
/// # Architecture
///
/// - [`schema::Schema`]: the record base; each record lists its fields
///   explicitly and gets property mapping, filters, hashing, hydration and
///   export for free
/// - [`query`]: `SELECT * FROM <kind> [WHERE ..]` construction
/// - [`cache`]: best-effort result cache with per-entry expiry
/// - [`clients::DatastoreClient`]: caller-held handle for `save`, `search`
///   and `run_query`
///
/// # Example
///
/// ```no_run
/// use datastore_mapper::{DatastoreClient, DynamicRecord, QueryOptions, RequestOptions, Schema};
/// use datastore_mapper::core::config::DatastoreConfig;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     datastore_mapper::setup_logging();
///
///     let config = DatastoreConfig::from_env()?;
///     let client = DatastoreClient::configure(&config)?;
///
///     let article = DynamicRecord::from_members(
///         "Article",
///         &["title_string_index", "views_int_index"],
///     )?
///     .with("title", "Rust")?;
///
///     client.save(&article, &RequestOptions::default()).await?;
///
///     for found in client.search(&article, &QueryOptions::default(), true).await? {
///         println!("{} {}", found.id(), found.export_json()?);
///     }
///
///     Ok(())
/// }
/// ```
pub mod cache;
pub mod clients;
pub mod core;
pub mod errors;
pub mod query;
pub mod schema;

pub use cache::{MemoryCache, ResultCache};
pub use clients::{DatastoreApi, DatastoreClient, HttpDatastoreApi, RequestOptions};
pub use errors::{DatastoreError, Result};
pub use query::{QueryOptions, build_query_string, create_schema_query};
pub use schema::{DynamicRecord, FieldDescriptor, FieldType, FieldValue, RecordId, Schema};

/// Configure structured JSON logging.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once keeps the first subscriber.
///
/// # Example
///
/// ```
/// datastore_mapper::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
