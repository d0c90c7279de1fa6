use std::time::Duration;

use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::ClientOptions,
    Client,
};
use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::models::ListQuery;

#[cfg(test)]
pub mod memory;
pub mod mongo;

pub use mongo::MongoInventoryStore;

/// Name of the collection holding every inventory item.
pub const INVENTORY_COLLECTION: &str = "inventory";

const FALLBACK_DATABASE: &str = "inventory";

/// One method per store operation the handlers issue. Each call is a single
/// round trip; nothing here retries or caches.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn find(&self, query: &ListQuery) -> AppResult<Vec<Document>>;

    async fn find_one(&self, id: ObjectId) -> AppResult<Option<Document>>;

    /// Returns the identity the store assigned.
    async fn insert_one(&self, item: Document) -> AppResult<ObjectId>;

    /// Returns how many records matched `id`.
    async fn replace_one(&self, id: ObjectId, item: Document) -> AppResult<u64>;

    /// Returns how many records were deleted.
    async fn delete_one(&self, id: ObjectId) -> AppResult<u64>;
}

/// Builds a pooled client from config and pings the server before returning.
pub async fn connect(config: &Config) -> anyhow::Result<Client> {
    let mut options = ClientOptions::parse(config.mongodb_uri.as_str()).await?;
    options.app_name = Some("inventory-api".to_string());
    options.max_pool_size = Some(config.mongodb_max_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.mongodb_connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.mongodb_connect_timeout_secs));

    let client = Client::with_options(options)?;
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await?;

    Ok(client)
}

/// Explicit database name first, then the one in the URI, then `inventory`.
pub fn database_for(client: &Client, config: &Config) -> mongodb::Database {
    let db = match config.mongodb_database {
        Some(ref name) => client.database(name),
        None => client
            .default_database()
            .unwrap_or_else(|| client.database(FALLBACK_DATABASE)),
    };
    info!(database = %db.name(), collection = INVENTORY_COLLECTION, "Using store");
    db
}
