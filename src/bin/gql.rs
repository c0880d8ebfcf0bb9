// Runs one GQL query against the configured dataset and prints the response.

use anyhow::{Context, bail};
use datastore_mapper::core::config::DatastoreConfig;
use datastore_mapper::core::models::RunQueryRequest;
use datastore_mapper::{DatastoreClient, RequestOptions};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    datastore_mapper::setup_logging();

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        bail!("usage: datastore-gql <GQL query>");
    }

    let config = DatastoreConfig::from_env().context("loading configuration")?;
    let client = DatastoreClient::configure(&config)?;

    info!(query = %query, "Running query");
    let response = client
        .run_query(&RunQueryRequest::gql(query), &RequestOptions::default())
        .await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
