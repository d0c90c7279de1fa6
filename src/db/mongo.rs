use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    Collection, Database,
};
use tracing::instrument;

use super::{InventoryStore, INVENTORY_COLLECTION};
use crate::error::{AppError, AppResult};
use crate::models::ListQuery;

/// Documents are kept untyped: beyond `product` and `price` an item is
/// whatever the caller sent.
#[derive(Clone)]
pub struct MongoInventoryStore {
    collection: Collection<Document>,
}

impl MongoInventoryStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Document>(INVENTORY_COLLECTION),
        }
    }
}

#[async_trait]
impl InventoryStore for MongoInventoryStore {
    #[instrument(skip(self))]
    async fn find(&self, query: &ListQuery) -> AppResult<Vec<Document>> {
        let mut find = self.collection.find(query.to_filter());
        if let Some(limit) = query.limit {
            find = find.limit(limit);
        }
        let items: Vec<Document> = find.await?.try_collect().await?;
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn find_one(&self, id: ObjectId) -> AppResult<Option<Document>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    #[instrument(skip(self, item))]
    async fn insert_one(&self, item: Document) -> AppResult<ObjectId> {
        let result = self.collection.insert_one(item).await?;
        result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::Internal(format!(
                "store assigned a non-ObjectId identity: {}",
                result.inserted_id
            ))
        })
    }

    #[instrument(skip(self, item))]
    async fn replace_one(&self, id: ObjectId, item: Document) -> AppResult<u64> {
        let result = self.collection.replace_one(doc! { "_id": id }, item).await?;
        Ok(result.matched_count)
    }

    #[instrument(skip(self))]
    async fn delete_one(&self, id: ObjectId) -> AppResult<u64> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count)
    }
}
