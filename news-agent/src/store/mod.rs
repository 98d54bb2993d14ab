pub mod memory;
pub mod postgres;
pub mod rest;

pub use memory::MemoryPostStore;
pub use postgres::PgPostStore;
pub use rest::RestPostStore;

use crate::config::StoreConfig;
use crate::traits::PostStore;
use crate::types::Result;
use reqwest::Client;
use std::sync::Arc;

/// Build the store selected by configuration. Connection failures are fatal to the caller.
pub async fn connect(config: &StoreConfig, http: Client) -> Result<Arc<dyn PostStore>> {
    match config {
        StoreConfig::Rest { url, service_key } => {
            Ok(Arc::new(RestPostStore::new(http, url, service_key)?))
        }
        StoreConfig::Postgres { database_url } => {
            Ok(Arc::new(PgPostStore::connect(database_url).await?))
        }
    }
}
