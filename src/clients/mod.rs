//! Clients for the remote store

pub mod auth;
pub mod datastore_client;
pub mod http_api;

pub use datastore_client::DatastoreClient;
pub use http_api::{DatastoreApi, HttpDatastoreApi, RequestOptions};
