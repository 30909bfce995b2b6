use std::collections::BTreeMap;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{FolderStore, ProductStore, StoreError, StoreResult};
use crate::model::{Folder, Product};

/// Process-local store for development runs and tests. Ordered by id, which
/// for object ids is creation order.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    items: RwLock<BTreeMap<ObjectId, Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn insert(&self, product: &Product) -> StoreResult<ObjectId> {
        let mut items = self.items.write().await;
        if items.contains_key(&product.id) {
            return Err(StoreError::Duplicate(product.id));
        }
        items.insert(product.id, product.clone());
        Ok(product.id)
    }

    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<Product>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn update(&self, product: &Product) -> StoreResult<()> {
        if let Some(stored) = self.items.write().await.get_mut(&product.id) {
            *stored = product.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> StoreResult<bool> {
        Ok(self.items.write().await.remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct MemoryFolderStore {
    items: RwLock<BTreeMap<ObjectId, Folder>>,
}

impl MemoryFolderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FolderStore for MemoryFolderStore {
    async fn insert(&self, folder: &Folder) -> StoreResult<ObjectId> {
        let mut items = self.items.write().await;
        if items.contains_key(&folder.id) {
            return Err(StoreError::Duplicate(folder.id));
        }
        items.insert(folder.id, folder.clone());
        Ok(folder.id)
    }

    async fn find_all(&self) -> StoreResult<Vec<Folder>> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<Folder>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn update(&self, folder: &Folder) -> StoreResult<()> {
        if let Some(stored) = self.items.write().await.get_mut(&folder.id) {
            *stored = folder.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> StoreResult<bool> {
        Ok(self.items.write().await.remove(&id).is_some())
    }
}
