#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use catalog_service::model::{CreateProductRequest, EntityRef, Folder, Product};
use catalog_service::store::{FolderStore, MemoryFolderStore, MemoryProductStore, ProductStore, StoreError, StoreResult};
use catalog_service::{CatalogError, ImageResolver, ProductService, TopicLookup};
use mongodb::bson::oid::ObjectId;
use service_registry::{Gateway, HttpGateway, PeerError};

pub const TOPIC_ID: &str = "65f1000000000000000000a1";
pub const FOLDER_ID: &str = "65f1000000000000000000f1";

pub fn gateway() -> Arc<dyn Gateway> {
    Arc::new(HttpGateway::new(Duration::from_secs(5)).unwrap())
}

/// Topics known by id; anything else is absent.
#[derive(Default)]
pub struct StaticTopics {
    topics: HashMap<String, EntityRef>,
    pub calls: AtomicUsize,
}

impl StaticTopics {
    pub fn with(mut self, id: &str, name: &str) -> Self {
        self.topics.insert(id.to_string(), EntityRef::new(id, name));
        self
    }
}

#[async_trait]
impl TopicLookup for StaticTopics {
    async fn fetch(&self, id: &str, credential: Option<&str>) -> Result<Option<EntityRef>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        credential.ok_or(CatalogError::MissingCredential)?;
        Ok(self.topics.get(id).cloned())
    }
}

pub struct UnreachableTopics;

#[async_trait]
impl TopicLookup for UnreachableTopics {
    async fn fetch(&self, _id: &str, _credential: Option<&str>) -> Result<Option<EntityRef>, CatalogError> {
        Err(CatalogError::Peer(PeerError::Unavailable {
            service: "media-service".to_string(),
        }))
    }
}

/// Resolves `key` to `https://cdn.test/{key}` unless the key is listed as broken.
#[derive(Default)]
pub struct FakeImages {
    broken: Vec<String>,
}

impl FakeImages {
    pub fn broken(keys: &[&str]) -> Self {
        Self {
            broken: keys.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ImageResolver for FakeImages {
    async fn resolve(&self, key: &str, _credential: Option<&str>) -> Result<String, CatalogError> {
        if self.broken.iter().any(|k| k == key) {
            return Err(CatalogError::ImageUnresolved(key.to_string()));
        }
        Ok(format!("https://cdn.test/{}", key))
    }
}

/// Folder store whose reads always fail.
pub struct BrokenFolderStore;

#[async_trait]
impl FolderStore for BrokenFolderStore {
    async fn insert(&self, folder: &Folder) -> StoreResult<ObjectId> {
        Err(StoreError::Duplicate(folder.id))
    }

    async fn find_all(&self) -> StoreResult<Vec<Folder>> {
        Ok(Vec::new())
    }

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<Folder>> {
        Err(StoreError::Duplicate(id))
    }

    async fn update(&self, _folder: &Folder) -> StoreResult<()> {
        Ok(())
    }

    async fn delete(&self, _id: ObjectId) -> StoreResult<bool> {
        Ok(false)
    }
}

/// Wraps the memory store and counts every call that reaches it.
#[derive(Default)]
pub struct CountingProductStore {
    inner: MemoryProductStore,
    pub calls: AtomicUsize,
}

impl CountingProductStore {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProductStore for CountingProductStore {
    async fn insert(&self, product: &Product) -> StoreResult<ObjectId> {
        self.hit();
        self.inner.insert(product).await
    }

    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        self.hit();
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<Product>> {
        self.hit();
        self.inner.find_by_id(id).await
    }

    async fn update(&self, product: &Product) -> StoreResult<()> {
        self.hit();
        self.inner.update(product).await
    }

    async fn delete(&self, id: ObjectId) -> StoreResult<bool> {
        self.hit();
        self.inner.delete(id).await
    }
}

pub async fn folder_store_with(name: &str) -> Arc<MemoryFolderStore> {
    let store = Arc::new(MemoryFolderStore::new());
    store
        .insert(&Folder {
            id: ObjectId::parse_str(FOLDER_ID).unwrap(),
            name: name.to_string(),
            parent_id: None,
        })
        .await
        .unwrap();
    store
}

pub fn create_request() -> CreateProductRequest {
    CreateProductRequest {
        product_name: "Jasmine tea".to_string(),
        original_price_store: 12.5,
        original_price_service: 15.0,
        product_description: "loose leaf".to_string(),
        cover_image: "IMG1".to_string(),
        topic_id: TOPIC_ID.to_string(),
        folder_id: FOLDER_ID.to_string(),
    }
}

pub async fn service_with(topics: Arc<dyn TopicLookup>, images: Arc<dyn ImageResolver>) -> ProductService {
    ProductService::new(
        Arc::new(MemoryProductStore::new()),
        folder_store_with("Drinks").await,
        topics,
        images,
    )
}
