//! Document-store repositories for products and folders.

mod memory;
mod mongo;

pub use memory::{MemoryFolderStore, MemoryProductStore};
pub use mongo::{MongoFolderStore, MongoProductStore, connect as connect_mongo};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::model::{Folder, Product};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("document encoding error: {0}")]
    Encoding(#[from] mongodb::bson::ser::Error),

    #[error("duplicate id {0}")]
    Duplicate(ObjectId),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: &Product) -> StoreResult<ObjectId>;

    async fn find_all(&self) -> StoreResult<Vec<Product>>;

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<Product>>;

    /// Overwrites every field of the stored document.
    async fn update(&self, product: &Product) -> StoreResult<()>;

    /// Returns whether a document was removed.
    async fn delete(&self, id: ObjectId) -> StoreResult<bool>;
}

#[async_trait]
pub trait FolderStore: Send + Sync {
    async fn insert(&self, folder: &Folder) -> StoreResult<ObjectId>;

    async fn find_all(&self) -> StoreResult<Vec<Folder>>;

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<Folder>>;

    async fn update(&self, folder: &Folder) -> StoreResult<()>;

    async fn delete(&self, id: ObjectId) -> StoreResult<bool>;
}
