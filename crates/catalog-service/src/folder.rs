use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use tracing::info;

use crate::error::CatalogError;
use crate::model::{CreateFolderRequest, Folder, FolderView, UpdateFolderRequest, parse_id};
use crate::store::FolderStore;

pub struct FolderService {
    folders: Arc<dyn FolderStore>,
}

fn parse_parent(parent_id: Option<&str>) -> Result<Option<ObjectId>, CatalogError> {
    parent_id.map(parse_id).transpose()
}

impl FolderService {
    pub fn new(folders: Arc<dyn FolderStore>) -> Self {
        Self { folders }
    }

    pub async fn create(&self, req: CreateFolderRequest) -> Result<String, CatalogError> {
        if req.name.trim().is_empty() {
            return Err(CatalogError::validation("name is required"));
        }

        let folder = Folder {
            id: ObjectId::new(),
            name: req.name,
            parent_id: parse_parent(req.parent_id.as_deref())?,
        };

        let id = self.folders.insert(&folder).await?;
        info!("Created folder {}", id);
        Ok(id.to_hex())
    }

    pub async fn list(&self) -> Result<Vec<FolderView>, CatalogError> {
        let folders = self.folders.find_all().await?;
        Ok(folders.into_iter().map(FolderView::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<FolderView, CatalogError> {
        self.load(id).await.map(FolderView::from)
    }

    pub async fn update(&self, id: &str, req: UpdateFolderRequest) -> Result<(), CatalogError> {
        let mut folder = self.load(id).await?;

        if !req.name.trim().is_empty() {
            folder.name = req.name;
        }
        if let Some(parent) = parse_parent(req.parent_id.as_deref())? {
            folder.parent_id = Some(parent);
        }

        self.folders.update(&folder).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let object_id = parse_id(id)?;
        if !self.folders.delete(object_id).await? {
            return Err(CatalogError::NotFound(format!("folder {}", id)));
        }
        info!("Deleted folder {}", id);
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Folder, CatalogError> {
        let object_id = parse_id(id)?;
        self.folders
            .find_by_id(object_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("folder {}", id)))
    }
}
