use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, to_document};
use mongodb::{Client, Collection, Database};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::{FolderStore, ProductStore, StoreResult};
use crate::model::{Folder, Product};

pub async fn connect(uri: &str, database: &str) -> StoreResult<Database> {
    let client = Client::with_uri_str(uri).await?;
    let db = client.database(database);
    db.run_command(doc! { "ping": 1 }).await?;
    info!("Connected to MongoDB database {}", database);
    Ok(db)
}

trait Keyed {
    fn key(&self) -> ObjectId;
}

impl Keyed for Product {
    fn key(&self) -> ObjectId {
        self.id
    }
}

impl Keyed for Folder {
    fn key(&self) -> ObjectId {
        self.id
    }
}

/// One collection of `T` documents keyed by `_id`.
struct MongoRepo<T: Send + Sync> {
    collection: Collection<T>,
}

impl<T> MongoRepo<T>
where
    T: Keyed + Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    async fn insert(&self, item: &T) -> StoreResult<ObjectId> {
        self.collection.insert_one(item).await?;
        Ok(item.key())
    }

    async fn find_all(&self) -> StoreResult<Vec<T>> {
        let cursor = self.collection.find(doc! {}).await?;
        let items: Vec<T> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<T>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn update(&self, item: &T) -> StoreResult<()> {
        let mut fields = to_document(item)?;
        fields.remove("_id");
        let result = self
            .collection
            .update_one(doc! { "_id": item.key() }, doc! { "$set": fields })
            .await?;
        debug!("update {} matched {} document(s)", item.key(), result.matched_count);
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> StoreResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

pub struct MongoProductStore(MongoRepo<Product>);

impl MongoProductStore {
    pub fn new(db: &Database) -> Self {
        Self(MongoRepo {
            collection: db.collection("products"),
        })
    }
}

#[async_trait]
impl ProductStore for MongoProductStore {
    async fn insert(&self, product: &Product) -> StoreResult<ObjectId> {
        self.0.insert(product).await
    }

    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        self.0.find_all().await
    }

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<Product>> {
        self.0.find_by_id(id).await
    }

    async fn update(&self, product: &Product) -> StoreResult<()> {
        self.0.update(product).await
    }

    async fn delete(&self, id: ObjectId) -> StoreResult<bool> {
        self.0.delete(id).await
    }
}

pub struct MongoFolderStore(MongoRepo<Folder>);

impl MongoFolderStore {
    pub fn new(db: &Database) -> Self {
        Self(MongoRepo {
            collection: db.collection("folders"),
        })
    }
}

#[async_trait]
impl FolderStore for MongoFolderStore {
    async fn insert(&self, folder: &Folder) -> StoreResult<ObjectId> {
        self.0.insert(folder).await
    }

    async fn find_all(&self) -> StoreResult<Vec<Folder>> {
        self.0.find_all().await
    }

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<Folder>> {
        self.0.find_by_id(id).await
    }

    async fn update(&self, folder: &Folder) -> StoreResult<()> {
        self.0.update(folder).await
    }

    async fn delete(&self, id: ObjectId) -> StoreResult<bool> {
        self.0.delete(id).await
    }
}
