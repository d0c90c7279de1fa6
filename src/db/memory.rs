use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;

use super::InventoryStore;
use crate::error::AppResult;
use crate::models::ListQuery;

/// In-process store that evaluates `ListQuery` the way the Mongo filter does.
/// Insertion order is preserved.
#[derive(Debug, Default)]
pub struct MemoryInventoryStore {
    items: RwLock<Vec<Document>>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn price_of(item: &Document) -> Option<f64> {
    match item.get("price")? {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn matches(query: &ListQuery, item: &Document) -> bool {
    if let Some(max_price) = query.max_price {
        match price_of(item) {
            Some(price) if price <= max_price as f64 => {}
            _ => return false,
        }
    }
    if let Some(ref prefix) = query.prefix {
        match item.get_str("product") {
            Ok(product) if product.to_lowercase().starts_with(&prefix.to_lowercase()) => {}
            _ => return false,
        }
    }
    true
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn find(&self, query: &ListQuery) -> AppResult<Vec<Document>> {
        let limit = query
            .limit
            .and_then(|limit| usize::try_from(limit).ok())
            .unwrap_or(usize::MAX);
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|item| matches(query, item))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_one(&self, id: ObjectId) -> AppResult<Option<Document>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .find(|item| item.get_object_id("_id").ok() == Some(id))
            .cloned())
    }

    async fn insert_one(&self, mut item: Document) -> AppResult<ObjectId> {
        let id = ObjectId::new();
        item.insert("_id", id);
        self.items.write().await.push(item);
        Ok(id)
    }

    async fn replace_one(&self, id: ObjectId, mut item: Document) -> AppResult<u64> {
        let mut items = self.items.write().await;
        match items
            .iter_mut()
            .find(|existing| existing.get_object_id("_id").ok() == Some(id))
        {
            Some(existing) => {
                item.insert("_id", id);
                *existing = item;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, id: ObjectId) -> AppResult<u64> {
        let mut items = self.items.write().await;
        let before = items.len();
        if let Some(pos) = items
            .iter()
            .position(|item| item.get_object_id("_id").ok() == Some(id))
        {
            items.remove(pos);
        }
        Ok((before - items.len()) as u64)
    }
}
